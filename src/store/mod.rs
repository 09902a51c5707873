//! Record store layer — the workspace pages/databases the inbox lives in.

pub mod notion;
pub mod traits;

pub use notion::NotionClient;
pub use traits::{
    Properties, PropertyValue, QueryPage, RawRecord, RecordFilter, RecordStore,
    properties_to_json,
};

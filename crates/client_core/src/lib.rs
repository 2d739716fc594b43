//! Entry creation, media handling and screen navigation for the captain's log.

pub mod factory;
pub mod media;
pub mod navigation;
pub mod probe;
pub mod timeline;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;

pub use factory::{EntryFactory, EntryInput};
pub use media::{parse_data_uri, to_data_uri, MediaBlob, MediaEncoder, MetadataProbe};
pub use navigation::{
    CreateForm, EntryDetail, FormVisibility, MediaElement, NavigationController, Presenter,
    Screen, ScreenName, ViewUpdate,
};
pub use probe::ContainerProbe;
pub use timeline::{Timeline, TimelineView, ViewRow};

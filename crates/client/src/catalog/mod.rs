//! Asset catalog: collaborator contracts, derived views, and mutations.
//!
//! - [`store`] - the seams to the remote asset table and thumbnail bucket
//! - [`view`] - pure filter/sort/statistics engine over the raw collection
//! - [`workflow`] - create/update/delete sequencing with local validation

pub mod store;
pub mod view;
pub mod workflow;

pub use store::{AssetRecord, AssetStore, ThumbnailStore};
pub use view::{CatalogFilter, CatalogStats, filtered_view};
pub use workflow::{AssetWorkflow, Attachment, MutationError};

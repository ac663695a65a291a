//! Domain model for the Fabrica facility-console data layer: record ids,
//! the facility-tree ordering, filter tuples, canonical query keys and page
//! arithmetic. Pure data, no I/O.

pub mod entity;
pub mod error;
pub mod facility;
pub mod filter;
pub mod ids;
pub mod page;

pub use entity::EntityKind;
pub use error::{FacilityError, FacilityResult};
pub use facility::{FacilityLevel, FacilityPath, FacilitySelection};
pub use filter::{ListFilter, QueryKey, QueryShape, DEFAULT_PAGE_SIZE};
pub use ids::{RecordId, RequestId};
pub use page::{clamp_page, Page};

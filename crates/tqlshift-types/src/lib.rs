//! Shared tqlshift model types.
//!
//! Pure data with no I/O: the engine, the HTTP client and the CLI all
//! exchange these without depending on each other.

pub mod app;
pub mod checkpoint;
pub mod family;
pub mod outcome;
pub mod position;
pub mod profile;

pub use app::AppName;
pub use checkpoint::{CheckpointEntry, CheckpointReport};
pub use family::{ConnectorFamily, ReaderType};
pub use outcome::{Disposition, FieldEdit, UnchangedReason};
pub use position::PositionDescriptor;
pub use profile::ServerProfile;

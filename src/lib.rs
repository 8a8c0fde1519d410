pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod lang;
pub mod name;
pub mod registry;
pub mod retry;
pub mod text;
pub mod translit;
pub mod upload;
pub mod vocab;

pub use batch::{process_batch, BatchOutcome, DerivationPasses};
pub use config::Config;
pub use error::{NameError, RemoteError};
pub use name::{NameContext, NameRecord, RawNameRecord, ValidationOptions};
pub use registry::{HttpPlaceRegistry, InMemoryPlaceRegistry, PlaceRegistry};
pub use translit::{HttpTransliterator, Transliterator};
pub use vocab::VocabularyCatalog;

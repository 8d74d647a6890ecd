pub mod catalog;
pub mod codec;
pub mod id_generator;
pub mod legacy;
pub mod node;
pub mod path;

pub use catalog::ElementCatalog;
pub use codec::{build_empty, decode, encode, OriginalType, RootSource, Wrapper};
pub use id_generator::{document_seed, IdGenerator};
pub use legacy::{LegacyError, LegacyResult};
pub use node::Node;

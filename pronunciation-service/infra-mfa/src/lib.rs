mod aligner;
mod corpus;
mod dictionary;
mod inspector;
mod process;
mod version;

pub use aligner::{MfaAligner, MfaAlignerConfig};
pub use corpus::FsCorpusBuilder;
pub use dictionary::{DictionaryConfig, HttpDictionaryProvisioner};
pub use inspector::{MfaInspector, MfaInspectorConfig};
pub use process::MfaCommand;
pub use version::MfaVersionProbe;

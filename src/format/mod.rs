pub mod codec;
mod exports;
mod header;
mod imports;
mod index;
mod names;

pub use codec::{FString, StringEncoding};
pub use exports::{classify_exports, read_exports, AssetKind, Export, EXPORT_RECORD_SIZE};
pub use header::{
    Header, HeaderTail, FIXED_STRUCT_SIZE, MAGIC, SUPPORTED_VERSIONS, TAIL_SIZE, UNVERSIONED_FLAG,
};
pub use imports::{
    read_imports, resolve_imports, Import, IMPORT_RECORD_SIZE, MATERIAL_CLASSES, NO_PARENT,
};
pub use index::PackageIndex;
pub use names::{NameHash, NameTable};

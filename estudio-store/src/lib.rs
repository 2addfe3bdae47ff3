pub mod bridge;
pub mod session;

pub use bridge::{CLAVE_ESTUDIO_ACTUAL, CLAVE_INDICE, EntradaIndice, SnapshotBridge};
pub use session::{MemoryStore, SessionStore, StoreError};

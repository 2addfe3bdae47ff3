mod comite;
mod estado;

pub use comite::{Comite, DecisionComite, DecisionEstado, Semaforo};
pub use estado::EstadoEstudio;

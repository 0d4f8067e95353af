pub mod errors;
pub mod observation;
pub mod space;
pub mod sparse;
pub mod sparsify;
pub mod window;

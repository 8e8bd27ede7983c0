pub mod ground_state;
pub mod optimize;
pub mod sk;
pub mod version;

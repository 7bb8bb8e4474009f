pub mod file;
pub mod memory;

pub use file::FileCredentialRepository;
pub use memory::InMemoryCredentialRepository;

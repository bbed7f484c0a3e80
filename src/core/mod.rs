mod audit;
mod inventory;
mod power;
mod vm;

pub use audit::Audit;
pub use inventory::ForemanInventory;
pub use power::PowerState;
pub use vm::VmRecord;

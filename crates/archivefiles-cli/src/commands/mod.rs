pub mod create;
pub mod doctor;
pub mod tar_name;

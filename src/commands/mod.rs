pub mod install_cmd;
pub mod update_cmd;

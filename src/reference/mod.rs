
/// Read-only existence checks of the genome and per-sample truth files
pub mod checker;
/// Downloads catalog references through the setup script
pub mod provisioner;

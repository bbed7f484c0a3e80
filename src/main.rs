fn main() {
    if let Err(err) = vmware_vs_foreman::cli::run() {
        vmware_vs_foreman::ui::eprintln_error(&err);
        std::process::exit(vmware_vs_foreman::exit::exit_code(&err));
    }
}

mod support;

use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};

fn base_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vmware-vs-foreman"));
    cmd.env("HOME", home);
    cmd.env_remove("VMWARE_USER");
    cmd.env_remove("VMWARE_PASS");
    cmd.env_remove("VMWARE_VS_FOREMAN_CONFIG");
    cmd.env_remove("VMWARE_VS_FOREMAN_PORT");
    cmd.env_remove("VMWARE_VS_FOREMAN_INSECURE");
    cmd.env_remove("VMWARE_VS_FOREMAN_TIMEOUT");
    cmd.env_remove("VMWARE_VS_FOREMAN_OUTPUT_CSV");
    cmd.env_remove("VMWARE_VS_FOREMAN_SMTP_RELAY");
    cmd.env_remove("VMWARE_VS_FOREMAN_SMTP_PORT");
    cmd.env_remove("VMWARE_VS_FOREMAN_MAIL_FROM");
    cmd.env_remove("VMWARE_VS_FOREMAN_LOG");
    cmd
}

fn with_creds(mut cmd: Command) -> Command {
    cmd.env("VMWARE_USER", "administrator@vsphere.local");
    cmd.env("VMWARE_PASS", "secret");
    cmd
}

fn run(mut cmd: Command, args: &[&str]) -> Output {
    cmd.args(args).output().expect("run vmware-vs-foreman")
}

/// A bound, non-blocking listener: any connection attempt shows up in `accept`.
fn sentinel() -> TcpListener {
    let l = TcpListener::bind("127.0.0.1:0").expect("bind");
    l.set_nonblocking(true).expect("nonblocking");
    l
}

fn assert_untouched(l: &TcpListener) {
    match l.accept() {
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
        Ok((_, peer)) => panic!("unexpected connection from {peer}"),
        Err(e) => panic!("accept failed: {e}"),
    }
}

#[test]
fn missing_user_exits_1_without_network() {
    let home = support::make_temp_dir("exit");
    let l = sentinel();
    let port = l.local_addr().unwrap().port().to_string();
    let csv = home.join("out.csv");

    let mut cmd = base_cmd(&home);
    cmd.env("VMWARE_PASS", "secret");
    let out = run(
        cmd,
        &[
            "-s",
            "127.0.0.1",
            "-o",
            &port,
            "-a",
            &format!("http://127.0.0.1:{port}/api/hosts"),
            "-f",
            csv.to_str().unwrap(),
        ],
    );

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("VMWARE_USER or VMWARE_PASS"), "stderr={stderr}");
    assert_untouched(&l);
    assert!(!csv.exists());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn missing_password_exits_1() {
    let home = support::make_temp_dir("exit");
    let mut cmd = base_cmd(&home);
    cmd.env("VMWARE_USER", "administrator@vsphere.local");
    let out = run(cmd, &["-s", "vc.invalid", "-a", "http://foreman.invalid/api/hosts"]);
    assert_eq!(out.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn missing_required_flag_exits_2() {
    let home = support::make_temp_dir("exit");
    let out = run(with_creds(base_cmd(&home)), &["-s", "vc.invalid"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn blank_recipients_exit_2() {
    let home = support::make_temp_dir("exit");
    let l = sentinel();
    let port = l.local_addr().unwrap().port().to_string();
    let out = run(
        with_creds(base_cmd(&home)),
        &[
            "-s",
            "127.0.0.1",
            "-o",
            &port,
            "-a",
            "http://foreman.invalid/api/hosts",
            "-e",
            " ",
        ],
    );
    assert_eq!(out.status.code(), Some(2));
    assert_untouched(&l);
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn broken_config_exits_2() {
    let home = support::make_temp_dir("exit");
    let cfg = home.join("config.toml");
    std::fs::write(&cfg, "[network]\ntimeout_secs = \"soon\"\n").expect("write config");
    let out = run(
        with_creds(base_cmd(&home)),
        &[
            "--config",
            cfg.to_str().unwrap(),
            "-s",
            "vc.invalid",
            "-a",
            "http://foreman.invalid/api/hosts",
        ],
    );
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn unreachable_vcenter_exits_10_and_writes_nothing() {
    let home = support::make_temp_dir("exit");
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").expect("bind");
        l.local_addr().unwrap().port().to_string()
    };
    let csv = home.join("out.csv");
    let out = run(
        with_creds(base_cmd(&home)),
        &[
            "-s",
            "127.0.0.1",
            "-o",
            &port,
            "-a",
            "http://127.0.0.1:9/api/hosts",
            "-f",
            csv.to_str().unwrap(),
            "--timeout",
            "5",
        ],
    );
    assert_eq!(out.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("error: VMware inventory from https://127.0.0.1:"), "stderr={stderr}");
    assert!(!csv.exists());
    let _ = std::fs::remove_dir_all(&home);
}

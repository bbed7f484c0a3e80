mod support;

use vmware_vs_foreman::core::{ForemanInventory, PowerState, VmRecord};
use vmware_vs_foreman::reconcile::reconcile;
use vmware_vs_foreman::report::write_csv;

#[test]
fn csv_matches_golden() {
    let vms = vec![
        VmRecord::new("U1", "vm1", PowerState::PoweredOn),
        VmRecord::new("u2", "vm2", PowerState::PoweredOff),
        VmRecord::new("4210-AB", "web, legacy", PowerState::Suspended),
        VmRecord::new("4210-cd", "テスト-vm", PowerState::PoweredOn),
        VmRecord::new("", "orphan", PowerState::Unknown),
    ];
    let hosts: ForemanInventory = [("u1", "vm1.example.com")].into_iter().collect();

    let dir = support::make_temp_dir("golden");
    let path = dir.join("vmware_vs_foreman.csv");
    write_csv(&path, &reconcile(&vms, &hosts)).expect("write csv");

    let actual = std::fs::read(&path).expect("read csv");
    assert_eq!(
        String::from_utf8(actual).expect("utf-8"),
        include_str!("golden/missing.csv")
    );
    let _ = std::fs::remove_dir_all(&dir);
}

mod common;

use common::{AlwaysUpPinger, MockPlatform};
use s3p_core::rollback::CreationLog;
use s3p_core::{
    Catalog, InstanceProvisioner, InstanceRequest, NetworkAllocator, ProvisionError,
    ReconcilerConfig, ResourceIds, cleanup_fleet, provision_fleet,
};

fn config() -> ReconcilerConfig {
    ReconcilerConfig::default()
}

#[tokio::test]
async fn provisions_one_host_with_derived_names() {
    let platform = MockPlatform::seeded(&["compute-5-11"]);
    let summary = provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap();

    assert_eq!(summary.hosts, 1);
    assert_eq!(summary.networks_created, 1);
    assert_eq!(summary.servers_created, 1);

    let state = platform.state.lock().unwrap();
    let network = state
        .networks
        .iter()
        .find(|n| n.name == "s3p-net-5")
        .expect("network s3p-net-5");
    let subnet = state
        .subnets
        .iter()
        .find(|s| s.network_id == network.id)
        .expect("subnet under s3p-net-5");
    assert_eq!(subnet.name, "s3p-net-5-sub");
    assert_eq!(subnet.cidr, "10.0.5.0/24");
    assert_eq!(subnet.gateway_ip, "10.0.5.1");
    assert!(state.servers.iter().any(|s| s.name == "tenant-5-11-1"));
    assert!(
        state
            .ops
            .contains(&"create_server:tenant-5-11-1@compute-5-11:s3p-net-5".to_string())
    );
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let platform = MockPlatform::seeded(&["compute-5-11", "compute-6-2"]);
    provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap();

    let creates_after_first = platform.count_ops("create_");
    let summary = provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap();

    assert_eq!(platform.count_ops("create_"), creates_after_first);
    assert_eq!(summary.networks_created, 0);
    assert_eq!(summary.servers_created, 0);
    assert_eq!(summary.networks_reused, 2);
    assert_eq!(summary.servers_reused, 2);
}

#[tokio::test]
async fn malformed_hypervisor_name_aborts_before_any_creation() {
    let platform = MockPlatform::seeded(&["compute-5-11", "compute-5"]);
    let err = provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::MalformedName(name) if name == "compute-5"));
    assert_eq!(platform.count_ops("create_"), 0);
}

#[tokio::test]
async fn instance_create_failure_rolls_back_the_created_network() {
    let platform = MockPlatform::seeded(&["compute-5-11"]);
    platform.fail_server_create();

    let err = provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::InstanceCreate { .. }));

    // The network and subnet created for the failing host are compensated.
    let ops = platform.ops();
    assert!(ops.contains(&"create_network:s3p-net-5".to_string()));
    assert!(ops.contains(&"delete_subnet:s3p-net-5-sub".to_string()));
    assert!(ops.contains(&"delete_network:s3p-net-5".to_string()));

    let state = platform.state.lock().unwrap();
    assert!(state.networks.is_empty());
    assert!(state.subnets.is_empty());
}

#[tokio::test]
async fn ensure_network_twice_creates_once() {
    let platform = MockPlatform::seeded(&[]);
    let allocator = NetworkAllocator::new(&platform);
    let mut catalog = Catalog::default();
    let mut log = CreationLog::default();

    let (first, created) = allocator
        .ensure(&mut catalog, &mut log, "s3p-net-5", 5)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(first.subnet_cidr, "10.0.5.0/24");
    assert_eq!(first.gateway_ip, "10.0.5.1");

    let (second, created) = allocator
        .ensure(&mut catalog, &mut log, "s3p-net-5", 5)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(platform.count_ops("create_network"), 1);
}

#[tokio::test]
async fn ensure_instance_on_cataloged_name_never_creates() {
    let platform = MockPlatform::seeded(&[]);
    platform.add_network("s3p-net-5", 5);
    platform.add_server("tenant-5-11-1", "s3p-net-5", "10.0.5.3");

    let cfg = config();
    let ids = ResourceIds::resolve(&platform, &cfg.defaults).await.unwrap();
    let provisioner = InstanceProvisioner::new(&platform, &AlwaysUpPinger, &cfg, &ids);
    let mut catalog = Catalog::snapshot(&platform, &cfg.defaults).await.unwrap();
    let mut log = CreationLog::default();

    let request = InstanceRequest {
        name: "tenant-5-11-1".to_string(),
        hypervisor: "compute-5-11".to_string(),
        network_name: "s3p-net-5".to_string(),
    };
    let (server, created) = provisioner
        .ensure(&mut catalog, &mut log, &request, true)
        .await
        .unwrap();

    assert!(!created);
    assert_eq!(server.name, "tenant-5-11-1");
    assert_eq!(platform.count_ops("create_server"), 0);
}

#[tokio::test]
async fn cleanup_deletes_instances_before_networks() {
    let platform = MockPlatform::seeded(&[]);
    platform.add_network("s3p-net-5", 5);
    platform.add_server("tenant-5-11-1", "s3p-net-5", "10.0.5.3");

    let summary = cleanup_fleet(&platform, &config()).await.unwrap();
    assert_eq!(summary.servers_deleted, 1);
    assert_eq!(summary.networks_deleted, 1);
    assert_eq!(summary.failures, 0);

    let ops = platform.ops();
    let last_server_delete = ops
        .iter()
        .rposition(|op| op.starts_with("delete_server"))
        .expect("server delete recorded");
    let first_network_delete = ops
        .iter()
        .position(|op| op.starts_with("delete_network") || op.starts_with("delete_subnet"))
        .expect("network delete recorded");
    assert!(last_server_delete < first_network_delete);

    let state = platform.state.lock().unwrap();
    assert!(state.servers.is_empty());
    assert!(state.networks.is_empty());
    assert!(state.subnets.is_empty());
}

#[tokio::test]
async fn cleanup_ignores_foreign_resources() {
    let platform = MockPlatform::seeded(&[]);
    platform.add_network("private", 0);
    platform.add_server("webserver", "private", "10.0.0.3");
    platform.add_network("s3p-net-5", 5);
    platform.add_server("tenant-5-11-1", "s3p-net-5", "10.0.5.3");

    let summary = cleanup_fleet(&platform, &config()).await.unwrap();
    assert_eq!(summary.servers_deleted, 1);
    assert_eq!(summary.networks_deleted, 1);

    let state = platform.state.lock().unwrap();
    assert!(state.servers.iter().any(|s| s.name == "webserver"));
    assert!(state.networks.iter().any(|n| n.name == "private"));
}

#[tokio::test]
async fn cleanup_on_empty_platform_deletes_nothing() {
    let platform = MockPlatform::seeded(&[]);
    let summary = cleanup_fleet(&platform, &config()).await.unwrap();

    assert_eq!(summary.servers_deleted, 0);
    assert_eq!(summary.networks_deleted, 0);
    assert_eq!(summary.failures, 0);
    assert!(platform.ops().is_empty());
}

#[tokio::test]
async fn shared_network_policy_reuses_one_network() {
    let platform = MockPlatform::seeded(&["compute-5-11", "compute-6-2"]);
    let cfg = ReconcilerConfig {
        policy: s3p_core::NetIndexPolicy::OneNet,
        ..ReconcilerConfig::default()
    };

    let summary = provision_fleet(&platform, &AlwaysUpPinger, &cfg)
        .await
        .unwrap();

    assert_eq!(summary.networks_created, 1);
    assert_eq!(summary.networks_reused, 1);
    assert_eq!(summary.servers_created, 2);
    assert_eq!(platform.count_ops("create_network"), 1);

    let state = platform.state.lock().unwrap();
    assert!(state.networks.iter().any(|n| n.name == "s3p-net-0"));
}

#[tokio::test]
async fn missing_image_aborts_before_provisioning() {
    let platform = MockPlatform::seeded(&["compute-5-11"]);
    platform.state.lock().unwrap().images.clear();

    let err = provision_fleet(&platform, &AlwaysUpPinger, &config())
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::Cloud(_)));
    assert_eq!(platform.count_ops("create_network"), 0);
    assert_eq!(platform.count_ops("create_server"), 0);
}

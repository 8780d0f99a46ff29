// crates/sep2-client/tests/pagination.rs

mod simulator;

use sep2_client::{EndDeviceInterface, Lfdi, Method};
use simulator::MockServer;

const AGGREGATOR_LFDI: &str = "0x21352135135";

fn device(id: u32, lfdi: &str) -> String {
    format!(
        "<EndDevice href=\"/edev/{}\"><deviceCategory>2097152</deviceCategory><lFDI>{}</lFDI></EndDevice>",
        id, lfdi
    )
}

fn device_page(all: u32, devices: &[String]) -> String {
    format!(
        "<EndDeviceList all=\"{}\" results=\"{}\">{}</EndDeviceList>",
        all,
        devices.len(),
        devices.concat()
    )
}

fn scripted_server() -> MockServer {
    let mut server = MockServer::new();
    server
        .respond_with_body(
            Method::Get,
            "/edev?s=0&l=2",
            200,
            &device_page(3, &[device(1, AGGREGATOR_LFDI), device(2, "0x222099d639e")]),
        )
        .respond_with_body(
            Method::Get,
            "/edev?s=2&l=2",
            200,
            &device_page(3, &[device(3, "0x3497623952")]),
        )
        .respond_with_body(Method::Get, "/edev?s=3&l=2", 200, &device_page(3, &[]));
    server
}

fn client(server: MockServer) -> EndDeviceInterface<MockServer> {
    let _ = env_logger::builder().is_test(true).try_init();
    EndDeviceInterface::new(server, Lfdi::new(AGGREGATOR_LFDI).unwrap()).unwrap()
}

#[test]
fn test_paging_skips_own_device_and_advances_by_page_length() {
    let mut client = client(scripted_server());
    let pages: Vec<_> = client
        .paged_devices(false, 0, 2)
        .collect::<Result<_, _>>()
        .unwrap();

    let ids: Vec<Vec<Option<u64>>> = pages
        .iter()
        .map(|page| page.iter().map(|d| d.edev_id()).collect())
        .collect();
    assert_eq!(ids, vec![vec![Some(2)], vec![Some(3)]]);
    assert_eq!(pages[0].all, Some(3));

    assert_eq!(
        client.transport().request_lines(),
        ["GET /edev?s=0&l=2", "GET /edev?s=2&l=2", "GET /edev?s=3&l=2"]
    );
}

#[test]
fn test_paging_can_include_own_device() {
    let mut client = client(scripted_server());
    let count: usize = client
        .paged_devices(true, 0, 2)
        .map(|page| page.unwrap().len())
        .sum();
    assert_eq!(count, 3);
}

#[test]
fn test_failed_request_ends_paging() {
    let mut server = MockServer::new();
    server.respond_with_body(
        Method::Get,
        "/edev?s=0&l=5",
        200,
        &device_page(9, &[device(1, "0x222099d639e")]),
    );

    let mut client = client(server);
    let mut pages = client.paged_devices(false, 0, 5);
    assert_eq!(pages.next().unwrap().unwrap().len(), 1);
    assert_eq!(pages.position(), 1);
    // GET /edev?s=1&l=5 has nothing scripted and answers 404.
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
}

#[test]
fn test_malformed_page_is_yielded_once_as_error() {
    let mut server = MockServer::new();
    server.respond_with_body(Method::Get, "/edev?s=0&l=5", 200, "<EndDeviceList><EndDevice>");

    let mut client = client(server);
    let mut pages = client.paged_devices(false, 0, 5);
    assert!(matches!(pages.next(), Some(Err(_))));
    assert!(pages.next().is_none());
}

#[test]
fn test_list_devices_single_page() {
    let mut client = client(scripted_server());
    let page = client.list_devices(2, 2).unwrap().unwrap();
    assert_eq!(page.len(), 1);
    assert!(client.list_devices(3, 2).unwrap().is_none());
    assert!(client.list_devices(0, 100).unwrap().is_none());
}

#[test]
fn test_mirror_usage_points_are_not_filtered() {
    let mup = |id: u32| {
        format!(
            "<MirrorUsagePoint href=\"/mup/{}\"><mRID>0x10000000{}</mRID><roleFlags>9</roleFlags>\
             <serviceCategoryKind>0</serviceCategoryKind><status>0</status>\
             <deviceLFDI>{}</deviceLFDI></MirrorUsagePoint>",
            id, id, AGGREGATOR_LFDI
        )
    };
    let mut server = MockServer::new();
    server.respond_with_body(
        Method::Get,
        "/mup?s=0&l=10",
        200,
        &format!(
            "<MirrorUsagePointList all=\"2\" results=\"2\">{}{}</MirrorUsagePointList>",
            mup(1),
            mup(2)
        ),
    );

    let mut client = client(server);
    let pages: Vec<_> = client.paged_mups(0, 10).collect();
    assert_eq!(pages.len(), 1);
    let page = pages[0].as_ref().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.items[1].mrid, "0x100000002");
}

#[test]
fn test_position_saturates_at_the_end_of_the_offset_range() {
    let start = u32::MAX - 1;
    let mut server = MockServer::new();
    server.respond_with_body(
        Method::Get,
        &format!("/edev?s={}&l=5", start),
        200,
        &device_page(9, &[device(1, "0x222099d639e"), device(2, "0x3497623952"), device(3, "0x3497623953")]),
    );

    let mut client = client(server);
    let mut pages = client.paged_devices(true, start, 5);
    assert_eq!(pages.next().unwrap().unwrap().len(), 3);
    assert_eq!(pages.position(), u32::MAX);
    assert!(pages.next().is_none());
}

// crates/sep2-client-http/examples/register_device.rs

//! Registers a charger and its DER with a 2030.5 server, then lists the
//! devices the aggregator owns.
//!
//! Settings come from `TWENTYTHIRTYDOTFIVE_*` variables or `.env.local`.
//! With `--dry-run`, nothing is sent: the requests are printed instead.
//!
//! ```text
//! cargo run -p sep2-client-http --example register_device -- --dry-run
//! ```

use sep2_client::model::{
    ActivePower, ConnectionPoint, Der, DerCapability, DeviceInformation, EndDevice,
    MirrorUsagePoint,
};
use sep2_client::types::{DerType, DeviceCategory, PowerSource, RoleFlags, ServiceKind};
use sep2_client::{
    DocumentingTransport, EndDeviceInterface, IdGenerator, Sep2Error, Transport,
    lfdi_from_label,
};
use sep2_client_http::{ClientConfig, create_client};
use std::error::Error;

/// IANA private enterprise number used in generated mRIDs.
const PEN: u32 = 0x1234;

fn charger() -> Result<EndDevice, Sep2Error> {
    let lfdi = lfdi_from_label("JetCharge:CM0056:")?;

    let mut info = DeviceInformation::new(lfdi.clone());
    info.mf_model = Some("CM-22".to_string());
    info.mf_ser_num = Some("CM0056".to_string());
    info.primary_power = PowerSource::Mains;

    let mut capability = DerCapability::new(DerType::Evse);
    capability.rtg_max_w = Some(ActivePower::new(22_000));

    Ok(EndDevice::new(lfdi, DeviceCategory::Evse)?
        .with_device_information(info)
        .with_der(Der::new(capability))
        .with_connection_point(ConnectionPoint {
            connection_point_id: Some("NMI-4102345678".to_string()),
            meter_id: None,
        }))
}

fn register<T: Transport>(client: &mut EndDeviceInterface<T>, ids: &mut IdGenerator) -> Result<(), Sep2Error> {
    let device = charger()?;
    let edev_id = client.sync_device(&device, None, true)?;
    log::info!("EndDevice {} registered as /edev/{}", device.lfdi, edev_id);

    let mup = MirrorUsagePoint::new(
        ids.next_mrid(PEN),
        RoleFlags::IS_MIRROR | RoleFlags::IS_DER | RoleFlags::IS_SUBMETER,
        ServiceKind::Electricity,
        device.lfdi.clone(),
    );
    let response = client.create_mup(&mup)?;
    if let Ok(mup_id) = response.resource_id() {
        log::info!("MirrorUsagePoint {} created as /mup/{}", mup.mrid, mup_id);
    }

    for page in client.paged_devices(false, 0, 10) {
        for device in &page? {
            log::info!("Owned device {} (sFDI {})", device.lfdi, device.sfdi);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut ids = IdGenerator::new();

    if std::env::args().any(|arg| arg == "--dry-run") {
        let transport = DocumentingTransport::new("https://sep2.example/", IdGenerator::starting_at(100));
        let mut client = EndDeviceInterface::new(transport, lfdi_from_label("Aggregator:0001")?)?;
        register(&mut client, &mut ids)?;
        for entry in client.transport().transcript() {
            println!("{}", entry);
        }
        return Ok(());
    }

    let config = ClientConfig::from_env()?;
    let mut client = create_client(&config)?;
    register(&mut client, &mut ids)?;
    client.transport_mut().close()?;
    Ok(())
}

// crates/sep2-client/src/interface.rs

//! Resource operations of an aggregator client and the device registration
//! sequence built on them.

use crate::error::Sep2Error;
use crate::list::{EndDeviceList, ListItem, MirrorUsagePointList, ResourceList};
use crate::log::{LogContext, client_debug, client_info, client_warn};
use crate::model::{
    ConnectionPoint, Der, DerCapability, DeviceInformation, EndDevice, MirrorMeterReading,
    MirrorUsagePoint,
};
use crate::resource::{Mode, decode_document, encode_document};
use crate::transport::{Response, Transport};
use crate::types::{DeviceCategory, Lfdi};
use alloc::format;
use core::marker::PhantomData;

/// Client of the EndDevice and MirrorUsagePoint function sets.
///
/// Every operation is one blocking exchange over the transport. Resource ids
/// are never generated here; they are read from the `location` header of the
/// server's answer.
pub struct EndDeviceInterface<T: Transport> {
    transport: T,
    lfdi: Lfdi,
}

impl<T: Transport> EndDeviceInterface<T> {
    /// Wraps `transport` and connects it.
    pub fn new(mut transport: T, lfdi: Lfdi) -> Result<Self, Sep2Error> {
        transport.connect()?;
        Ok(Self { transport, lfdi })
    }

    /// LFDI of the aggregator itself.
    pub fn lfdi(&self) -> &Lfdi {
        &self.lfdi
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    // --- EndDevice ---

    /// One page of `/edev`. `None` when the request fails or the page is past the end.
    pub fn list_devices(&mut self, start: u32, limit: u32) -> Result<Option<EndDeviceList>, Sep2Error> {
        self.list_page("/edev", start, limit)
    }

    /// Lazily walks `/edev` page by page.
    ///
    /// Unless `include_self` is set, the aggregator's own EndDevice is removed
    /// from every page. Paging advances by the unfiltered page length.
    pub fn paged_devices(
        &mut self,
        include_self: bool,
        start: u32,
        page_size: u32,
    ) -> PagedResources<'_, T, EndDevice> {
        PagedResources::new(self, "/edev", include_self, start, page_size)
    }

    pub fn create_device(&mut self, device: &EndDevice) -> Result<Response, Sep2Error> {
        self.transport.post("/edev", &encode_document(device, Mode::Create)?)
    }

    /// Replaces the device at `edev_id` with the create-mode representation.
    pub fn update_device(&mut self, device: &EndDevice, edev_id: u64) -> Result<Response, Sep2Error> {
        // TODO: not yet exercised against a live server; confirm it accepts a PUT on /edev/{id}.
        self.transport
            .put(&format!("/edev/{}", edev_id), &encode_document(device, Mode::Create)?)
    }

    /// The device at `edev_id`, or `None` (with a warning) on any status but 200.
    pub fn get_device(&mut self, edev_id: u64) -> Result<Option<EndDevice>, Sep2Error> {
        let response = self.transport.get(&format!("/edev/{}", edev_id))?;
        if response.status == 200 {
            return decode_document(&response.body).map(Some);
        }
        client_warn!(LogContext::edev(edev_id), "No EndDevice found");
        Ok(None)
    }

    pub fn create_device_information(
        &mut self,
        info: &DeviceInformation,
        edev_id: u64,
    ) -> Result<Response, Sep2Error> {
        self.transport
            .put(&format!("/edev/{}/di", edev_id), &encode_document(info, Mode::Create)?)
    }

    /// Creates an empty DER container under the device.
    pub fn create_der(&mut self, der: &Der, edev_id: u64) -> Result<Response, Sep2Error> {
        self.transport
            .post(&format!("/edev/{}/der", edev_id), &encode_document(der, Mode::Create)?)
    }

    pub fn create_der_capability(
        &mut self,
        capability: &DerCapability,
        edev_id: u64,
        der_id: u64,
    ) -> Result<Response, Sep2Error> {
        self.transport.put(
            &format!("/edev/{}/der/{}/dercap", edev_id, der_id),
            &encode_document(capability, Mode::Create)?,
        )
    }

    pub fn create_connection_point(
        &mut self,
        connection_point: &ConnectionPoint,
        edev_id: u64,
    ) -> Result<Response, Sep2Error> {
        self.transport.put(
            &format!("/edev/{}/cp", edev_id),
            &encode_document(connection_point, Mode::Create)?,
        )
    }

    /// The EndDevice that represents the aggregator itself.
    pub fn self_device(&self) -> Result<EndDevice, Sep2Error> {
        EndDevice::new(self.lfdi.clone(), DeviceCategory::VirtualOrMixedDer)
    }

    pub fn create_self_device(&mut self) -> Result<Response, Sep2Error> {
        let device = self.self_device()?;
        self.create_device(&device)
    }

    /// Registers `device` (unless `edev_id` is given) and optionally its nested resources.
    ///
    /// Returns the device's server id.
    ///
    /// # Errors
    /// `UnexpectedStatus` when the server does not answer the device POST with
    /// 201. Failures of nested resources are logged and skipped. Transport and
    /// decoding errors always propagate.
    pub fn sync_device(
        &mut self,
        device: &EndDevice,
        edev_id: Option<u64>,
        create_nested: bool,
    ) -> Result<u64, Sep2Error> {
        let edev_id = match edev_id {
            Some(id) => id,
            None => {
                client_info!(
                    "No edevID supplied. Attempting to create EndDevice {}",
                    device.lfdi
                );
                let response = self.create_device(device)?;
                if response.status != 201 {
                    return Err(Sep2Error::UnexpectedStatus {
                        status: response.status,
                        body: response.body,
                    });
                }
                response.resource_id()?
            }
        };

        // The read-back is not compared with `device` yet.
        let _ = self.get_device(edev_id)?;

        if create_nested {
            self.sync_nested(device, edev_id)?;
        }
        Ok(edev_id)
    }

    fn sync_nested(&mut self, device: &EndDevice, edev_id: u64) -> Result<(), Sep2Error> {
        let ctx = LogContext::edev(edev_id);

        let response = match &device.device_information {
            Some(info) => self.create_device_information(info, edev_id)?,
            None => self.create_device_information(&DeviceInformation::new(device.lfdi.clone()), edev_id)?,
        };
        if response.status > 201 {
            client_warn!(ctx, "DeviceInformation could not be stored: {}", response.status);
        }

        for der in &device.der {
            let response = self.create_der(der, edev_id)?;
            if response.status > 201 {
                client_warn!(ctx, "DER could not be created: {}", response.status);
            }
            let der_id = match response.resource_id() {
                Ok(id) => id,
                Err(e) => {
                    client_warn!(ctx, "Skipping DERCapability: {}", e);
                    continue;
                }
            };
            if let Some(capability) = &der.der_capability {
                let response = self.create_der_capability(capability, edev_id, der_id)?;
                if response.status > 201 {
                    client_warn!(ctx, "DERCapability of DER {} could not be stored: {}", der_id, response.status);
                }
            }
        }

        if let Some(connection_point) = &device.connection_point {
            let response = self.create_connection_point(connection_point, edev_id)?;
            if response.status > 201 {
                client_warn!(ctx, "ConnectionPoint could not be stored: {}", response.status);
            }
        }
        Ok(())
    }

    /// POSTs every device in turn.
    ///
    /// `create_der` and `abort_on_error` are accepted for interface
    /// compatibility and currently have no effect.
    pub fn sync_devices(
        &mut self,
        devices: &[EndDevice],
        create_der: bool,
        abort_on_error: bool,
    ) -> Result<(), Sep2Error> {
        client_debug!(
            "Syncing {} devices (create_der={}, abort_on_error={})",
            devices.len(),
            create_der,
            abort_on_error
        );
        for device in devices {
            self.create_device(device)?;
        }
        Ok(())
    }

    // --- MirrorUsagePoint ---

    pub fn list_mups(&mut self, start: u32, limit: u32) -> Result<Option<MirrorUsagePointList>, Sep2Error> {
        self.list_page("/mup", start, limit)
    }

    pub fn paged_mups(&mut self, start: u32, page_size: u32) -> PagedResources<'_, T, MirrorUsagePoint> {
        PagedResources::new(self, "/mup", true, start, page_size)
    }

    pub fn create_mup(&mut self, mup: &MirrorUsagePoint) -> Result<Response, Sep2Error> {
        let response = self.transport.post("/mup", &encode_document(mup, Mode::Create)?)?;
        if let Ok(mup_id) = response.resource_id() {
            client_info!(LogContext::mup(mup_id), "Created MirrorUsagePoint {}", mup.mrid);
        }
        Ok(response)
    }

    pub fn create_mirror_meter_reading(
        &mut self,
        mup_id: u64,
        reading: &MirrorMeterReading,
    ) -> Result<Response, Sep2Error> {
        client_debug!(LogContext::mup(mup_id), "Posting MirrorMeterReading {}", reading.mrid);
        self.transport
            .post(&format!("/mup/{}", mup_id), &encode_document(reading, Mode::Create)?)
    }

    fn list_page<R: ListItem>(
        &mut self,
        collection: &str,
        start: u32,
        limit: u32,
    ) -> Result<Option<ResourceList<R>>, Sep2Error> {
        let response = self
            .transport
            .get(&format!("{}?s={}&l={}", collection, start, limit))?;
        if !response.is_success() {
            return Ok(None);
        }
        let page = ResourceList::decode_page(&response.body)?;
        if page.is_none() {
            client_debug!("No {} returned for s={}", R::ELEMENT, start);
        }
        Ok(page)
    }
}

/// Pull-based pager over a list resource.
///
/// Each call to `next` issues one GET. Iteration ends at the first page past
/// the end, or after yielding an error.
pub struct PagedResources<'a, T: Transport, R: ListItem> {
    interface: &'a mut EndDeviceInterface<T>,
    collection: &'static str,
    include_self: bool,
    start: u32,
    page_size: u32,
    finished: bool,
    _item: PhantomData<R>,
}

impl<'a, T: Transport, R: ListItem> PagedResources<'a, T, R> {
    fn new(
        interface: &'a mut EndDeviceInterface<T>,
        collection: &'static str,
        include_self: bool,
        start: u32,
        page_size: u32,
    ) -> Self {
        Self {
            interface,
            collection,
            include_self,
            start,
            page_size,
            finished: false,
            _item: PhantomData,
        }
    }

    /// Offset of the next page to request.
    pub fn position(&self) -> u32 {
        self.start
    }
}

impl<T: Transport, R: ListItem> Iterator for PagedResources<'_, T, R> {
    type Item = Result<ResourceList<R>, Sep2Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let page = self
            .interface
            .list_page::<R>(self.collection, self.start, self.page_size);
        match page {
            Ok(Some(mut page)) if !page.is_empty() => {
                let read = u32::try_from(page.len()).unwrap_or(u32::MAX);
                self.start = self.start.saturating_add(read);
                if !self.include_self {
                    let own = &self.interface.lfdi;
                    page.items.retain(|item| item.lfdi() != Some(own));
                }
                Some(Ok(page))
            }
            Ok(_) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documenting::DocumentingTransport;
    use crate::identity::IdGenerator;
    use crate::types::DerType;

    fn interface() -> EndDeviceInterface<DocumentingTransport> {
        let transport = DocumentingTransport::new("https://server", IdGenerator::starting_at(3));
        EndDeviceInterface::new(transport, Lfdi::new("0x21352135135").unwrap()).unwrap()
    }

    #[test]
    fn test_new_connects_transport() {
        assert!(interface().transport().is_connected());
    }

    #[test]
    fn test_self_device_uses_aggregator_lfdi() {
        let device = interface().self_device().unwrap();
        assert_eq!(device.device_category, DeviceCategory::VirtualOrMixedDer);
        assert_eq!(device.lfdi.as_str(), "0x21352135135");
    }

    #[test]
    fn test_sync_device_against_documenting_transport() {
        let mut client = interface();
        let device = EndDevice::new(Lfdi::new("0x222099d639e").unwrap(), DeviceCategory::PhotovoltaicSystem)
            .unwrap()
            .with_der(Der::new(DerCapability::new(DerType::PhotovoltaicSystem)));

        let edev_id = client.sync_device(&device, None, true).unwrap();
        assert_eq!(edev_id, 3);

        let requests: alloc::vec::Vec<_> = client
            .transport()
            .transcript()
            .iter()
            .map(|entry| entry.lines().next().unwrap_or_default())
            .collect();
        assert_eq!(
            requests,
            [
                "POST https://server/edev",
                "GET https://server/edev/3",
                "PUT https://server/edev/3/di",
                "POST https://server/edev/3/der",
                "PUT https://server/edev/3/der/5/dercap",
            ]
        );
    }

    #[test]
    fn test_unknown_collection_page_is_none() {
        let mut client = interface();
        assert!(client.list_mups(0, 10).unwrap().is_none());
        assert_eq!(client.paged_devices(false, 0, 10).count(), 0);
    }
}

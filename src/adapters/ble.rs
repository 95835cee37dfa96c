//! BLE Nordic UART Service link adapter.
//!
//! Implements [`LinkPort`]: the remote-control app writes Bluefruit
//! packets to the RX characteristic.  TX is registered so stock NUS
//! clients find the full service, but the rover never sends on it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys`.
//! - **all other targets**: simulation hooks (`sim_connect`, `sim_receive`, ...)
//!   for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                                     | Perms                |
//! |----------------|------------------------------------------|----------------------|
//! | Service        | `6e400001-b5a3-f393-e0a9-e50e24dcca9e`   |                      |
//! | RX             | `6e400002-…`                             | Write, Write w/o rsp |
//! | TX             | `6e400003-…`                             | Notify               |
//!
//! ## Threading
//!
//! ```text
//!  Bluedroid task                         main loop
//!  ──────────────                         ─────────
//!  WRITE_EVT ──▶ LinkBridge::on_rx ──▶ [RX channel] ──▶ BleLink::read_next_frame
//!  CONNECT   ──▶ connected=true, session+=1              └─▶ PacketFramer
//!  DISCONNECT──▶ connected=false, re-advertise if still wanted
//! ```
//!
//! Chunks are tagged with the session that produced them, so bytes left
//! over from a previous central never leak into the next session.
//!
//! The controller stops advertising as soon as a central connects.  A
//! central that connects and drops between two loop iterations is never
//! seen by the session, which therefore never asks to advertise again;
//! the disconnect path restarts advertising itself whenever the loop still
//! wants it.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info};

use crate::app::ports::LinkPort;
use crate::error::LinkError;
use crate::protocol::{PacketFramer, RawFrame};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x6e40_0001_b5a3_f393_e0a9_e50e_24dc_ca9e;
pub const CHAR_RX: u128 = 0x6e40_0002_b5a3_f393_e0a9_e50e_24dc_ca9e;
pub const CHAR_TX: u128 = 0x6e40_0003_b5a3_f393_e0a9_e50e_24dc_ca9e;

/// Bytes carried per queued RX chunk.  Longer GATT writes are split.
pub const RX_CHUNK_LEN: usize = 32;
/// Queued chunks before the callback starts dropping.
pub const RX_QUEUE_DEPTH: usize = 16;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

impl fmt::Display for BleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Advertising => write!(f, "advertising"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Callback → main loop bridge
// ───────────────────────────────────────────────────────────────

/// One GATT write (or a slice of a long one).
#[derive(Debug, Clone)]
pub struct RxChunk {
    pub session: u32,
    pub data: heapless::Vec<u8, RX_CHUNK_LEN>,
}

/// State shared between the Bluedroid callback task and [`BleLink`].
pub struct LinkBridge {
    rx: Channel<CriticalSectionRawMutex, RxChunk, RX_QUEUE_DEPTH>,
    connected: AtomicBool,
    /// Advertising requested by the main loop.
    adv_wanted: AtomicBool,
    /// Advertising as far as the host side knows.
    advertising: AtomicBool,
    session: AtomicU32,
    dropped_chunks: AtomicU32,
}

impl LinkBridge {
    pub const fn new() -> Self {
        Self {
            rx: Channel::new(),
            connected: AtomicBool::new(false),
            adv_wanted: AtomicBool::new(false),
            advertising: AtomicBool::new(false),
            session: AtomicU32::new(0),
            dropped_chunks: AtomicU32::new(0),
        }
    }

    /// The controller leaves advertising once a connection forms.
    pub fn on_connect(&self) {
        self.session.fetch_add(1, Ordering::AcqRel);
        self.advertising.store(false, Ordering::Release);
        self.connected.store(true, Ordering::Release);
    }

    /// Returns `true` when advertising must be restarted.
    pub fn on_disconnect(&self) -> bool {
        self.connected.store(false, Ordering::Release);
        let again = self.adv_wanted.load(Ordering::Acquire);
        if again {
            self.advertising.store(true, Ordering::Release);
        }
        again
    }

    pub fn request_advertising(&self, wanted: bool) {
        self.adv_wanted.store(wanted, Ordering::Release);
        self.advertising.store(wanted, Ordering::Release);
    }

    pub fn advertise_wanted(&self) -> bool {
        self.adv_wanted.load(Ordering::Acquire)
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising.load(Ordering::Acquire)
    }

    /// Queue received bytes.  Never blocks; drops when the queue is full.
    pub fn on_rx(&self, data: &[u8]) {
        let session = self.session.load(Ordering::Acquire);
        for piece in data.chunks(RX_CHUNK_LEN) {
            let mut chunk = RxChunk {
                session,
                data: heapless::Vec::new(),
            };
            // `piece` is at most RX_CHUNK_LEN bytes.
            let _ = chunk.data.extend_from_slice(piece);
            if self.rx.try_send(chunk).is_err() {
                self.dropped_chunks.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn session(&self) -> u32 {
        self.session.load(Ordering::Acquire)
    }

    pub fn dropped_chunks(&self) -> u32 {
        self.dropped_chunks.load(Ordering::Relaxed)
    }

    fn try_take(&self) -> Option<RxChunk> {
        self.rx.try_receive().ok()
    }
}

impl Default for LinkBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// The bridge the Bluedroid callbacks write into.
pub static BRIDGE: LinkBridge = LinkBridge::new();

// ───────────────────────────────────────────────────────────────
// ESP-IDF Bluedroid glue
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics carry handles from the callbacks to the adapter.

#[cfg(target_os = "espidf")]
mod platform {
    use core::sync::atomic::{AtomicU32, Ordering};

    use esp_idf_svc::sys::*;

    use super::{BRIDGE, CHAR_RX, CHAR_TX, SERVICE_UUID};

    static SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
    static RX_HANDLE: AtomicU32 = AtomicU32::new(0);
    static TX_HANDLE: AtomicU32 = AtomicU32::new(0);
    static CHAR_STEP: AtomicU32 = AtomicU32::new(0);

    /// Bit 0: adv data configured, bit 1: scan response configured.
    static ADV_CONFIG_DONE: AtomicU32 = AtomicU32::new(0);
    const ADV_CONFIG_ALL: u32 = 0b11;

    static mut SERVICE_UUID_LE: [u8; 16] = SERVICE_UUID.to_le_bytes();

    fn uuid128(uuid: u128) -> esp_bt_uuid_t {
        // SAFETY: esp_bt_uuid_t is a plain C struct/union; all-zero is valid.
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 16;
        t.uuid.uuid128 = uuid.to_le_bytes();
        t
    }

    fn uuid16(uuid: u16) -> esp_bt_uuid_t {
        // SAFETY: as above.
        let mut t: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 2;
        t.uuid.uuid16 = uuid;
        t
    }

    fn adv_params() -> esp_ble_adv_params_t {
        esp_ble_adv_params_t {
            adv_int_min: 0x20,
            adv_int_max: 0x40,
            adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
            own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
            channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
            adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
            // SAFETY: remaining fields are plain integers/arrays.
            ..unsafe { core::mem::zeroed() }
        }
    }

    fn maybe_start_advertising() {
        if BRIDGE.advertise_wanted()
            && ADV_CONFIG_DONE.load(Ordering::Acquire) == ADV_CONFIG_ALL
        {
            let mut params = adv_params();
            // SAFETY: params outlives the call; Bluedroid copies it.
            unsafe {
                esp_ble_gap_start_advertising(&mut params);
            }
        }
    }

    unsafe fn add_char(svc_handle: u16, uuid: u128, perm: u32, prop: u32) {
        let mut char_uuid = uuid128(uuid);
        // SAFETY: pointers are valid for the duration of the call.
        unsafe {
            esp_ble_gatts_add_char(
                svc_handle,
                &mut char_uuid,
                perm as esp_gatt_perm_t,
                prop as esp_gatt_char_prop_t,
                core::ptr::null_mut(),
                core::ptr::null_mut(),
            );
        }
    }

    unsafe extern "C" fn gap_event_handler(
        event: esp_gap_ble_cb_event_t,
        param: *mut esp_ble_gap_cb_param_t,
    ) {
        match event {
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
                ADV_CONFIG_DONE.fetch_or(0b01, Ordering::AcqRel);
                maybe_start_advertising();
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RSP_DATA_SET_COMPLETE_EVT => {
                ADV_CONFIG_DONE.fetch_or(0b10, Ordering::AcqRel);
                maybe_start_advertising();
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
                // SAFETY: param is valid for this event per Bluedroid contract.
                let status = unsafe { (*param).adv_start_cmpl.status };
                if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                    log::info!("BLE GAP: advertising started");
                } else {
                    log::warn!("BLE GAP: advertising start failed ({})", status);
                }
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising stopped");
            }
            _ => {}
        }
    }

    unsafe extern "C" fn gatts_event_handler(
        event: esp_gatts_cb_event_t,
        gatts_if: esp_gatt_if_t,
        param: *mut esp_ble_gatts_cb_param_t,
    ) {
        // SAFETY: every branch reads only the union member that matches
        // `event`, which Bluedroid guarantees is initialised.
        unsafe {
            match event {
                esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
                    log::info!("BLE GATTS: app registered (if={})", gatts_if);
                    let mut svc_id = esp_gatt_srvc_id_t {
                        id: esp_gatt_id_t {
                            uuid: uuid128(SERVICE_UUID),
                            inst_id: 0,
                        },
                        is_primary: true,
                    };
                    // service + 2 chars (2 handles each) + CCCD
                    esp_ble_gatts_create_service(gatts_if, &mut svc_id, 8);
                }
                esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
                    let svc_handle = (*param).create.service_handle;
                    SVC_HANDLE.store(u32::from(svc_handle), Ordering::Release);
                    esp_ble_gatts_start_service(svc_handle);
                    CHAR_STEP.store(1, Ordering::Release);
                    add_char(
                        svc_handle,
                        CHAR_RX,
                        ESP_GATT_PERM_WRITE,
                        ESP_GATT_CHAR_PROP_BIT_WRITE | ESP_GATT_CHAR_PROP_BIT_WRITE_NR,
                    );
                }
                esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
                    let handle = (*param).add_char.attr_handle;
                    let svc_handle = SVC_HANDLE.load(Ordering::Acquire) as u16;
                    match CHAR_STEP.load(Ordering::Acquire) {
                        1 => {
                            RX_HANDLE.store(u32::from(handle), Ordering::Release);
                            CHAR_STEP.store(2, Ordering::Release);
                            add_char(
                                svc_handle,
                                CHAR_TX,
                                ESP_GATT_PERM_READ,
                                ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                            );
                        }
                        2 => {
                            TX_HANDLE.store(u32::from(handle), Ordering::Release);
                            CHAR_STEP.store(3, Ordering::Release);
                            let mut cccd = uuid16(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
                            esp_ble_gatts_add_char_descr(
                                svc_handle,
                                &mut cccd,
                                (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                                core::ptr::null_mut(),
                                core::ptr::null_mut(),
                            );
                        }
                        _ => {}
                    }
                }
                esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
                    log::info!(
                        "BLE GATTS: UART service ready (rx={}, tx={})",
                        RX_HANDLE.load(Ordering::Acquire),
                        TX_HANDLE.load(Ordering::Acquire)
                    );
                }
                esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
                    let conn_id = (*param).connect.conn_id;
                    BRIDGE.on_connect();
                    log::info!("BLE GATTS: central connected (conn_id={})", conn_id);
                }
                esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
                    log::info!("BLE GATTS: central disconnected");
                    if BRIDGE.on_disconnect() {
                        log::info!("BLE GATTS: advertising still wanted, restarting");
                        maybe_start_advertising();
                    }
                }
                esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
                    let p = &(*param).write;
                    if u32::from(p.handle) == RX_HANDLE.load(Ordering::Acquire) && !p.is_prep {
                        let data = core::slice::from_raw_parts(p.value, p.len as usize);
                        BRIDGE.on_rx(data);
                    }
                    if p.need_rsp {
                        esp_ble_gatts_send_response(
                            gatts_if,
                            p.conn_id,
                            p.trans_id,
                            esp_gatt_status_t_ESP_GATT_OK,
                            core::ptr::null_mut(),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// Bring up controller + Bluedroid and register the UART service.
    pub fn init_stack(device_name: &str) -> Result<(), i32> {
        let mut name = [0u8; 32];
        let len = device_name.len().min(name.len() - 1);
        name[..len].copy_from_slice(&device_name.as_bytes()[..len]);

        // SAFETY: one-shot init from the main task; Bluedroid copies the
        // name and the advertising payloads.
        unsafe {
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                return Err(ret);
            }

            esp_ble_gap_register_callback(Some(gap_event_handler));
            esp_ble_gatts_register_callback(Some(gatts_event_handler));
            esp_ble_gatts_app_register(0);

            esp_ble_gap_set_device_name(name.as_ptr() as *const _);

            // Name in the advertisement, 128-bit service UUID in the scan
            // response: both do not fit in 31 bytes together.
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: true,
                include_txpower: false,
                min_interval: 0x0006,
                max_interval: 0x0010,
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut adv_data);

            let mut scan_rsp = esp_ble_adv_data_t {
                set_scan_rsp: true,
                include_name: false,
                service_uuid_len: 16,
                p_service_uuid: (&raw mut SERVICE_UUID_LE).cast(),
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut scan_rsp);
        }
        Ok(())
    }

    /// Call after [`BRIDGE`] records the request.
    pub fn start_advertising() {
        maybe_start_advertising();
    }

    pub fn stop_advertising() {
        // SAFETY: no-op if not advertising.
        unsafe {
            esp_ble_gap_stop_advertising();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BLE link adapter
// ───────────────────────────────────────────────────────────────

pub struct BleLink {
    bridge: &'static LinkBridge,
    /// Stack bring-up failed; the link stays down until reboot.
    failed: bool,
    device_name: heapless::String<24>,
    framer: PacketFramer,
    /// Chunk currently being framed, and how far into it we are.
    pending: Option<(RxChunk, usize)>,
    /// Session the framer is synchronised to.
    session: u32,
    stale_chunks: u32,
    #[cfg(target_os = "espidf")]
    stack_ready: bool,
}

impl BleLink {
    /// Adapter bound to the global callback bridge.
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self::with_bridge(device_name, &BRIDGE)
    }

    /// Adapter bound to a caller-supplied bridge.
    pub fn with_bridge(device_name: heapless::String<24>, bridge: &'static LinkBridge) -> Self {
        Self {
            bridge,
            failed: false,
            device_name,
            framer: PacketFramer::new(),
            pending: None,
            session: bridge.session(),
            stale_chunks: 0,
            #[cfg(target_os = "espidf")]
            stack_ready: false,
        }
    }

    pub fn state(&self) -> BleState {
        if self.failed {
            BleState::Failed
        } else if self.bridge.is_connected() {
            BleState::Connected
        } else if self.bridge.is_advertising() {
            BleState::Advertising
        } else {
            BleState::Idle
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Chunks discarded because they belonged to an earlier session.
    pub fn stale_chunks(&self) -> u32 {
        self.stale_chunks
    }

    /// Resynchronise on a new session: forget the partial packet and
    /// any chunk in hand.
    fn sync_session(&mut self) {
        let current = self.bridge.session();
        if current != self.session {
            debug!("BLE: session {} -> {}, framer reset", self.session, current);
            self.session = current;
            self.framer.reset();
            self.pending = None;
        }
    }

    fn next_chunk(&mut self) -> Option<RxChunk> {
        while let Some(chunk) = self.bridge.try_take() {
            if chunk.session == self.session {
                return Some(chunk);
            }
            self.stale_chunks = self.stale_chunks.wrapping_add(1);
        }
        None
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start_advertising(&mut self) {
        if !self.stack_ready {
            match platform::init_stack(&self.device_name) {
                Ok(()) => {
                    self.stack_ready = true;
                    info!("BLE(espidf): Bluedroid up, name '{}'", self.device_name);
                }
                Err(rc) => {
                    log::error!("BLE(espidf): stack init failed ({})", rc);
                    self.failed = true;
                    self.bridge.request_advertising(false);
                    return;
                }
            }
        }
        platform::start_advertising();
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_advertising(&mut self) {
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop_advertising(&mut self) {
        if self.stack_ready {
            platform::stop_advertising();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop_advertising(&mut self) {
        info!("BLE(sim): advertising stopped");
    }
}

// ── Host simulation hooks ─────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl BleLink {
    /// Simulate a central attaching.
    pub fn sim_connect(&self) {
        self.bridge.on_connect();
    }

    /// Simulate the central going away.  Advertising resumes if it is
    /// still wanted, as on target.
    pub fn sim_disconnect(&self) {
        if self.bridge.on_disconnect() {
            info!("BLE(sim): advertising restarted after disconnect");
        }
    }

    /// Simulate a GATT write to the RX characteristic.
    pub fn sim_receive(&self, data: &[u8]) {
        self.bridge.on_rx(data);
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort implementation
// ───────────────────────────────────────────────────────────────

impl LinkPort for BleLink {
    fn start_advertising(&mut self) {
        if self.failed {
            return;
        }
        info!("BLE: advertising as '{}'", self.device_name);
        self.bridge.request_advertising(true);
        self.platform_start_advertising();
    }

    fn stop_advertising(&mut self) {
        if self.bridge.advertise_wanted() {
            self.bridge.request_advertising(false);
            self.platform_stop_advertising();
        }
    }

    fn is_connected(&self) -> bool {
        self.bridge.is_connected()
    }

    fn read_next_frame(&mut self) -> Result<Option<RawFrame>, LinkError> {
        if !self.bridge.is_connected() {
            return Err(LinkError::Disconnected);
        }
        self.sync_session();
        loop {
            if let Some((chunk, cursor)) = self.pending.as_mut() {
                while *cursor < chunk.data.len() {
                    let byte = chunk.data[*cursor];
                    *cursor += 1;
                    if let Some(frame) = self.framer.push(byte) {
                        return Ok(Some(frame));
                    }
                }
                self.pending = None;
            }

            let Some(chunk) = self.next_chunk() else {
                return Ok(None);
            };
            self.pending = Some((chunk, 0));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

use display_identity::{WmiRecord, serial_from_char_codes};
use tracing::{debug, instrument};
use windows::Win32::{
    Foundation::{RPC_E_CHANGED_MODE, RPC_E_TOO_LATE},
    System::{
        Com::{
            CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx,
            CoInitializeSecurity, CoSetProxyBlanket, CoUninitialize, EOAC_NONE,
            RPC_C_AUTHN_LEVEL_CALL, RPC_C_AUTHN_LEVEL_DEFAULT, RPC_C_IMP_LEVEL_IMPERSONATE,
        },
        Rpc::{RPC_C_AUTHN_WINNT, RPC_C_AUTHZ_NONE},
        Wmi::{
            IEnumWbemClassObject, IWbemClassObject, IWbemContext, IWbemLocator, IWbemServices,
            WBEM_FLAG_FORWARD_ONLY, WBEM_FLAG_RETURN_IMMEDIATELY, WBEM_INFINITE, WbemLocator,
        },
    },
};
use windows_core::{BSTR, PCWSTR, w};

use crate::{
    Error, LabelledWinResult, WinError, result::LabelledWinResultExt, variant::OwnedVariant,
};

const NAMESPACE: &str = r"ROOT\WMI";
const MONITOR_ID_QUERY: &str = "SELECT InstanceName, SerialNumberID FROM WmiMonitorID";

/// Keeps COM initialized on the current thread.
struct ComGuard {
    uninitialize: bool,
}

impl ComGuard {
    fn initialize() -> LabelledWinResult<Self> {
        let result = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };

        // Already initialized with another apartment model, which is still usable.
        if result == RPC_E_CHANGED_MODE {
            debug!("COM already initialized on this thread");
            return Ok(Self {
                uninitialize: false,
            });
        }

        if result.is_err() {
            return Err(WinError::from_hresult(result, "CoInitializeEx"));
        }

        let guard = Self { uninitialize: true };

        let security = unsafe {
            CoInitializeSecurity(
                None,
                -1,
                None,
                None,
                RPC_C_AUTHN_LEVEL_DEFAULT,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
                None,
            )
        };
        match security {
            Err(e) if e.code() == RPC_E_TOO_LATE => debug!("COM security already initialized"),
            result => result.label("CoInitializeSecurity")?,
        }

        Ok(guard)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.uninitialize {
            unsafe { CoUninitialize() };
        }
    }
}

/// A connection to the `ROOT\WMI` namespace.
pub struct WmiConnection {
    services: IWbemServices,
    // Declared last so COM outlives the services proxy.
    _com: ComGuard,
}

impl WmiConnection {
    /// Connects to the namespace on the local machine.
    #[instrument(level = "debug", err)]
    pub fn connect() -> LabelledWinResult<Self> {
        let com = ComGuard::initialize()?;

        let locator: IWbemLocator =
            unsafe { CoCreateInstance(&WbemLocator, None, CLSCTX_INPROC_SERVER) }
                .label("CoCreateInstance")?;

        let services = unsafe {
            locator.ConnectServer(
                &BSTR::from(NAMESPACE),
                &BSTR::new(),
                &BSTR::new(),
                &BSTR::new(),
                0,
                &BSTR::new(),
                None::<&IWbemContext>,
            )
        }
        .label("IWbemLocator::ConnectServer")?;

        unsafe {
            CoSetProxyBlanket(
                &services,
                RPC_C_AUTHN_WINNT,
                RPC_C_AUTHZ_NONE,
                PCWSTR::null(),
                RPC_C_AUTHN_LEVEL_CALL,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
            )
        }
        .label("CoSetProxyBlanket")?;

        Ok(Self {
            services,
            _com: com,
        })
    }

    /// One record per monitor WMI knows about.
    #[instrument(level = "debug", skip_all, err)]
    pub fn monitor_ids(&self) -> Result<Vec<WmiRecord>, Error> {
        let enumerator: IEnumWbemClassObject = unsafe {
            self.services.ExecQuery(
                &BSTR::from("WQL"),
                &BSTR::from(MONITOR_ID_QUERY),
                WBEM_FLAG_FORWARD_ONLY | WBEM_FLAG_RETURN_IMMEDIATELY,
                None::<&IWbemContext>,
            )
        }
        .label("IWbemServices::ExecQuery")?;

        let mut records = Vec::new();
        loop {
            let mut objects = [None];
            let mut returned = 0;

            let result = unsafe { enumerator.Next(WBEM_INFINITE, &mut objects, &mut returned) };
            if result.is_err() {
                return Err(WinError::from_hresult(result, "IEnumWbemClassObject::Next").into());
            }

            let [Some(object)] = objects else {
                break;
            };
            if returned == 0 {
                break;
            }

            records.push(monitor_id(&object)?);
        }

        debug!("Found {} WMI monitor record(s)", records.len());

        Ok(records)
    }
}

fn monitor_id(object: &IWbemClassObject) -> Result<WmiRecord, Error> {
    let instance_id = OwnedVariant::property(object, w!("InstanceName"))?
        .as_string()
        .filter(|instance_id| !instance_id.is_empty())
        .ok_or(Error::MissingProperty {
            property: "InstanceName",
        })?;

    let codes = OwnedVariant::property(object, w!("SerialNumberID"))?
        .as_integers()?
        .ok_or(Error::MissingProperty {
            property: "SerialNumberID",
        })?;

    let serial_number = serial_from_char_codes(codes);
    if serial_number.is_empty() {
        return Err(Error::EmptySerial { instance_id });
    }

    Ok(WmiRecord::new(instance_id, serial_number))
}

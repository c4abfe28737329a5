use core::{ffi::c_void, ptr::null_mut, slice};

use windows::Win32::System::{
    Ole::{
        SafeArrayAccessData, SafeArrayGetLBound, SafeArrayGetUBound, SafeArrayGetVartype,
        SafeArrayUnaccessData,
    },
    Variant::{
        VARENUM, VARIANT, VT_ARRAY, VT_BSTR, VT_I1, VT_I2, VT_I4, VT_INT, VT_UI1, VT_UI2, VT_UI4,
        VT_UINT, VariantClear,
    },
    Wmi::IWbemClassObject,
};
use windows_core::PCWSTR;

use crate::{LabelledWinResult, result::LabelledWinResultExt};

/// A `VARIANT` that is cleared on drop.
pub struct OwnedVariant(VARIANT);

impl OwnedVariant {
    /// Reads a property of a WMI object.
    pub fn property(object: &IWbemClassObject, name: PCWSTR) -> LabelledWinResult<Self> {
        let mut variant = Self(VARIANT::default());
        unsafe { object.Get(name, 0, &mut variant.0, None, None) }.label("IWbemClassObject::Get")?;
        Ok(variant)
    }

    fn vartype(&self) -> VARENUM {
        unsafe { self.0.Anonymous.Anonymous.vt }
    }

    /// The string value, `None` if the variant does not hold a `BSTR`.
    pub fn as_string(&self) -> Option<String> {
        if self.vartype() != VT_BSTR {
            return None;
        }

        let value = unsafe { &self.0.Anonymous.Anonymous.Anonymous.bstrVal };
        Some(value.to_string())
    }

    /// The elements of an integer array, `None` if the variant does not hold one.
    pub fn as_integers(&self) -> LabelledWinResult<Option<Vec<i32>>> {
        if self.vartype().0 & VT_ARRAY.0 == 0 {
            return Ok(None);
        }

        let array = unsafe { self.0.Anonymous.Anonymous.Anonymous.parray };
        if array.is_null() {
            return Ok(None);
        }

        let (element, lower, upper) = unsafe {
            (
                SafeArrayGetVartype(array).label("SafeArrayGetVartype")?,
                SafeArrayGetLBound(array, 1).label("SafeArrayGetLBound")?,
                SafeArrayGetUBound(array, 1).label("SafeArrayGetUBound")?,
            )
        };
        let count = usize::try_from(i64::from(upper) - i64::from(lower) + 1).unwrap_or(0);

        let mut data: *mut c_void = null_mut();
        unsafe { SafeArrayAccessData(array, &mut data) }.label("SafeArrayAccessData")?;

        let values = unsafe {
            match element {
                VT_I4 | VT_UI4 | VT_INT | VT_UINT => Some(
                    slice::from_raw_parts(data as *const i32, count).to_vec(),
                ),
                VT_I2 | VT_UI2 => Some(
                    slice::from_raw_parts(data as *const u16, count)
                        .iter()
                        .map(|&value| i32::from(value))
                        .collect(),
                ),
                VT_I1 | VT_UI1 => Some(
                    slice::from_raw_parts(data as *const u8, count)
                        .iter()
                        .map(|&value| i32::from(value))
                        .collect(),
                ),
                _ => None,
            }
        };

        unsafe { SafeArrayUnaccessData(array) }.label("SafeArrayUnaccessData")?;

        Ok(values)
    }
}

impl Drop for OwnedVariant {
    fn drop(&mut self) {
        // Clearing an initialized variant only fails for unsupported types.
        let _ = unsafe { VariantClear(&mut self.0) };
    }
}

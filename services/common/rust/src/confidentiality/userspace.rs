use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8192;

pub struct UserSpaceConfidentiality {
    _src_fullpath: String,
    // the cache stays small, the only readers so far are database
    // credentials and third-party API keys
    _cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            _cached: RwLock::new(HashMap::new()),
            _src_fullpath: fullpath,
        }
    }

    fn load_source(&self) -> DefaultResult<JsnVal, AppConfidentialityError> {
        let srcpath = self._src_fullpath.as_str();
        let mut file = File::open(srcpath).map_err(|e| AppConfidentialityError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: e.to_string(),
        })?;
        let fsize = file
            .metadata()
            .map(|m| m.len())
            .unwrap_or(SOURCE_SIZE_LIMIT_NBYTES);
        if fsize >= SOURCE_SIZE_LIMIT_NBYTES {
            return Err(AppConfidentialityError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: format!("source-file-size: {fsize}"),
            });
        }
        let mut rawbuf = Vec::new(); // the source file is small by the limit above
        file.read_to_end(&mut rawbuf)
            .map_err(|e| AppConfidentialityError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: e.to_string(),
            })?;
        serde_json::from_slice::<JsnVal>(&rawbuf).map_err(|e| AppConfidentialityError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: e.to_string(),
        })
    } // end of fn load_source

    fn search_json_payload<'a>(
        toplvl: &'a JsnVal,
        id_: &str,
    ) -> DefaultResult<&'a JsnVal, AppConfidentialityError> {
        let mut curr_lvl = toplvl;
        for tok in id_.split('/') {
            let nxt = match curr_lvl {
                JsnVal::Object(o) => o.get(tok),
                JsnVal::Array(a) => tok.parse::<usize>().ok().and_then(|idx| a.get(idx)),
                _others => None,
            };
            curr_lvl = nxt.ok_or(AppConfidentialityError {
                code: AppErrorCode::NoConfidentialityCfg,
                detail: format!("path:{id_}, token:{tok}"),
            })?;
        }
        Ok(curr_lvl)
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        {
            let rguard = self
                ._cached
                .read()
                .map_err(|e| AppConfidentialityError {
                    code: AppErrorCode::AcquireLockFailure,
                    detail: e.to_string(),
                })?;
            if let Some(hit) = rguard.get(id_) {
                return Ok(hit.clone());
            }
        } // read guard dropped before reloading the source
        let toplvl = self.load_source()?;
        let found = Self::search_json_payload(&toplvl, id_)?;
        let serial = match found {
            JsnVal::String(s) => s.clone(),
            _others => found.to_string(),
        };
        let mut wguard = self
            ._cached
            .write()
            .map_err(|e| AppConfidentialityError {
                code: AppErrorCode::AcquireLockFailure,
                detail: e.to_string(),
            })?;
        wguard.insert(id_.to_string(), serial.clone());
        Ok(serial)
    } // end of fn try_get_payload
}

use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use serde::de::Error as DeserializeError;
use serde::Deserialize;

use crate::constant::{env_vars, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};
use crate::{AppLogAlias, WebApiPath};

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize)]
pub struct WebApiRouteCfg {
    pub path: WebApiPath,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub handler: String,
}

#[derive(Deserialize)]
pub struct WebApiListenCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub api_version: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors: String,
    pub routes: Vec<WebApiRouteCfg>,
}

#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug, Clone)]
pub enum AppDbServerType {
    MariaDB,
}

#[derive(Deserialize, Debug)]
pub struct AppDbServerCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub srv_type: AppDbServerType,
    pub max_conns: u32,
    pub acquire_timeout_secs: u16, // for acquiring connection from pool
    pub idle_timeout_secs: u16,
    pub confidentiality_path: String,
    pub db_name: String,
}

#[allow(non_camel_case_types)]
#[derive(Deserialize)]
#[serde(tag = "_type")]
pub enum AppDataStoreCfg {
    DbServer(AppDbServerCfg),
}

/// endpoint of one third-party collaborator, e.g. courier aggregator,
/// transactional-mail sender, telegram bot API host. In `test` mode the
/// adapter layer substitutes a mock which reads canned data instead of
/// connecting anywhere.
#[allow(non_camel_case_types)]
#[derive(Deserialize)]
#[serde(tag = "mode")]
pub enum App3rdPartyCfg {
    dev {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        name: String,
        host: String,
        port: u16,
        confidentiality_path: String,
    },
    test {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        name: String,
        data_src: String,
    },
}

impl App3rdPartyCfg {
    pub fn label(&self) -> &str {
        match self {
            Self::dev { name, .. } => name.as_str(),
            Self::test { name, .. } => name.as_str(),
        }
    }
}

#[derive(Deserialize)]
pub struct AppAuthCfg {
    pub keystore_url: String,
    pub update_interval_minutes: u32,
}

#[derive(Deserialize)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
}

#[derive(Deserialize)]
pub struct ApiServerCfg {
    pub logging: AppLoggingCfg,
    pub listen: WebApiListenCfg,
    pub limit_req_body_in_bytes: usize,
    pub num_workers: u8,
    pub data_store: Vec<AppDataStoreCfg>,
    pub third_parties: Vec<Arc<App3rdPartyCfg>>,
    pub auth: AppAuthCfg,
    pub confidentiality: AppConfidentialCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub api_server: ApiServerCfg,
}

pub struct AppCfgHardLimit {
    pub num_db_conns: u32,
    pub seconds_db_idle: u16,
}

pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let (mut env_var_map, limit) = (args.env_var_map, args.limit);
        let sys_basepath = env_var_map
            .remove(env_vars::SYS_BASEPATH)
            .map(|s| s + "/")
            .ok_or(AppCfgError {
                code: AppErrorCode::MissingSysBasePath,
                detail: None,
            })?;
        let app_basepath = env_var_map
            .remove(env_vars::SERVICE_BASEPATH)
            .map(|s| s + "/")
            .ok_or(AppCfgError {
                code: AppErrorCode::MissingAppBasePath,
                detail: None,
            })?;
        let cfg_relpath = env_var_map
            .remove(env_vars::CFG_FILEPATH)
            .ok_or(AppCfgError {
                code: AppErrorCode::MissingConfigPath,
                detail: None,
            })?;
        let fullpath = app_basepath.clone() + cfg_relpath.as_str();
        let api_srv_cfg = Self::parse_from_file(fullpath, limit)?;
        Ok(Self {
            api_server: api_srv_cfg,
            basepath: AppBasepathCfg {
                system: sys_basepath,
                service: app_basepath,
            },
        })
    } // end of fn new

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<ApiServerCfg, AppCfgError> {
        let fileobj = File::open(filepath).map_err(|e| AppCfgError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: Some(e.to_string()),
        })?;
        let reader = BufReader::new(fileobj);
        let jsnobj =
            serde_json::from_reader::<BufReader<File>, ApiServerCfg>(reader).map_err(|e| {
                AppCfgError {
                    code: AppErrorCode::InvalidJsonFormat,
                    detail: Some(e.to_string()),
                }
            })?;
        Self::_check_web_listener(&jsnobj.listen)?;
        Self::_check_logging(&jsnobj.logging)?;
        Self::_check_datastore(&jsnobj.data_store, limit)?;
        Ok(jsnobj)
    } // end of fn parse_from_file

    fn _check_web_listener(cfg: &WebApiListenCfg) -> DefaultResult<(), AppCfgError> {
        let version_legit = cfg
            .api_version
            .split('.')
            .all(|tok| !tok.is_empty() && tok.chars().all(|c| c.is_ascii_digit()));
        if !version_legit {
            return Err(AppCfgError {
                code: AppErrorCode::InvalidVersion,
                detail: Some(cfg.api_version.clone()),
            });
        }
        if cfg.routes.is_empty() {
            return Err(AppCfgError {
                code: AppErrorCode::NoRouteApiServerCfg,
                detail: None,
            });
        }
        let malformed = cfg
            .routes
            .iter()
            .find(|r| r.path.is_empty() || !r.path.starts_with('/'));
        if let Some(r) = malformed {
            Err(AppCfgError {
                code: AppErrorCode::InvalidRouteConfig,
                detail: Some(format!("path:{}, handler:{}", r.path, r.handler)),
            })
        } else {
            Ok(())
        }
    } // end of fn _check_web_listener

    fn _check_logging(cfg: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        if cfg.handlers.is_empty() {
            return Err(AppCfgError {
                code: AppErrorCode::NoLogHandlerCfg,
                detail: None,
            });
        }
        if cfg.loggers.is_empty() {
            return Err(AppCfgError {
                code: AppErrorCode::NoLoggerCfg,
                detail: None,
            });
        }
        let iter = cfg.handlers.iter().map(|h| h.alias.as_str());
        let hdlr_aliases: HashSet<&str, RandomState> = HashSet::from_iter(iter);
        for logger in cfg.loggers.iter() {
            if logger.handlers.is_empty() {
                return Err(AppCfgError {
                    code: AppErrorCode::NoHandlerInLoggerCfg,
                    detail: Some(logger.alias.to_string()),
                });
            }
            let missing = logger
                .handlers
                .iter()
                .find(|a| !hdlr_aliases.contains(a.as_str()));
            if let Some(a) = missing {
                return Err(AppCfgError {
                    code: AppErrorCode::MissingAliasLogHdlerCfg,
                    detail: Some(a.clone()),
                });
            }
        }
        Ok(())
    } // end of fn _check_logging

    fn _check_datastore(
        cfg: &[AppDataStoreCfg],
        limit: AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if cfg.is_empty() {
            return Err(AppCfgError {
                code: AppErrorCode::NoDatabaseCfg,
                detail: None,
            });
        }
        let exceeding = cfg.iter().find(|c| match c {
            AppDataStoreCfg::DbServer(d) => {
                d.max_conns > limit.num_db_conns || d.idle_timeout_secs > limit.seconds_db_idle
            }
        });
        if let Some(AppDataStoreCfg::DbServer(d)) = exceeding {
            Err(AppCfgError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(d.alias.clone()),
            })
        } else {
            Ok(())
        }
    }
} // end of impl AppConfig

fn jsn_deny_empty_string<'de, D>(raw: D) -> DefaultResult<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let val = String::deserialize(raw)?;
    if val.is_empty() {
        let unexp = serde::de::Unexpected::Str(val.as_str());
        Err(DeserializeError::invalid_value(unexp, &"non-empty string"))
    } else {
        Ok(val)
    }
}

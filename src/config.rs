use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

/// Upstream API settings. Credentials are optional here because they are
/// usually provided through the environment, see `proxy::Credentials`.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Upstream {
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub app_token: Option<String>,
    pub table_id: Option<String>,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for Upstream {
    fn default() -> Self {
        Upstream {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: None,
            app_secret: None,
            app_token: None,
            table_id: None,
            page_size: 500,
            max_pages: 20,
            timeout_secs: None,
        }
    }
}

/// Column names of the table, as they appear under `fields` in each record.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Fields {
    pub category: String,
    pub title: String,
    pub body: String,
    pub published: String,
    pub cover: String,
}

impl Default for Fields {
    fn default() -> Self {
        Fields {
            category: "分类".to_string(),
            title: "标题".to_string(),
            body: "内容".to_string(),
            published: "发布时间".to_string(),
            cover: "封面".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TabConfig {
    pub key: String,
    pub label: String,
    /// Category to filter on. Without `category` and `link` the tab lists everything.
    pub category: Option<String>,
    /// Plain link, the tab is not handled by the card list.
    pub link: Option<String>,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_page_size() -> u32 {
    12
}

fn default_utc_offset_minutes() -> i32 {
    8 * 60
}

fn default_no_content() -> String {
    "No content yet, come back later.".to_string()
}

#[derive(Deserialize)]
pub struct Site {
    pub proxy_url: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_no_content")]
    pub no_content_message: String,
    pub timeout_secs: Option<u64>,
    pub paths: Paths,
    pub tabs: Vec<TabConfig>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub server: Server,
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub fields: Fields,
    pub site: Option<Site>,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
    let str_path = path.to_string_lossy();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    }
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;

    if let Some(ref mut site) = cfg.site {
        site.paths = Paths {
            template_dir: parse_path(site.paths.template_dir.clone())?,
            public_dir: parse_path(site.paths.public_dir.clone())?,
        };
    }

    Ok(cfg)
}

/// Looks for `file_name` next to the executable, then in the current directory,
/// then in the user config directory.
pub fn find_config(file_name: &str) -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe_path| exe_path.parent().map(PathBuf::from));
    let candidates = [exe_dir, env::current_dir().ok(), dirs::config_dir()];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(file_name))
        .find(|path| path.exists())
}

/// Reads the config from `cfg_path`, or from the first `file_name` found by `find_config`.
/// A `[log]` section without location writes to `log_file_name` in the user cache directory.
pub fn open_config(cfg_path: Option<PathBuf>, file_name: &str, log_file_name: &str) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(|| find_config(file_name)) {
        None => return Err(format!("Could not find {}", file_name)),
        Some(x) => x,
    };

    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path).map_err(|e| e.to_string())?;

    if let Some(ref mut log) = config.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir()
                .map(|dir| dir.join("Bitfolio").join("log").join(log_file_name));
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled but no cache directory was found. Using stdout"),
        }
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

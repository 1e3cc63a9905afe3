//! # File I/O Module
//!
//! Reads and writes building files:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: keep two estimators from editing the same file
//! - **Version validation**: refuse files from a newer schema
//!
//! ## File Format
//!
//! Buildings are saved as `.qto` files containing JSON.
//! Lock files use `.qto.lock` extension with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use takeoff_core::file_io::{save_building, load_building, FileLock};
//! use takeoff_core::building::Building;
//! use std::path::Path;
//!
//! let building = Building::new("Warehouse");
//! let path = Path::new("warehouse.qto");
//!
//! // Acquire lock before saving
//! let lock = FileLock::acquire(path, "estimator@company.com").unwrap();
//!
//! // Save with atomic write
//! save_building(&building, path).unwrap();
//!
//! // Lock is released when dropped
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::building::{Building, SCHEMA_VERSION};
use crate::errors::{CalcError, CalcResult};

/// Locks older than this are taken over regardless of owner
pub const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.qto.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// A lock is stale when its process is gone (same machine, linux only)
    /// or it is older than [`STALE_LOCK_HOURS`].
    pub fn is_stale(&self) -> bool {
        if (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS {
            return true;
        }
        let same_machine = hostname().is_some_and(|h| h == self.machine);
        same_machine && !process_alive(self.pid)
    }

    /// "user (machine)"
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

/// Machine name from `COMPUTERNAME` (Windows), `HOSTNAME`/`HOST`, or
/// `/etc/hostname` on Linux.
fn hostname() -> Option<String> {
    #[cfg(windows)]
    let from_env = std::env::var("COMPUTERNAME").ok();
    #[cfg(not(windows))]
    let from_env = std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::env::var("HOST").ok());

    from_env
        .or_else(hostname_file)
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

#[cfg(target_os = "linux")]
fn hostname_file() -> Option<String> {
    fs::read_to_string("/etc/hostname").ok()
}

#[cfg(not(target_os = "linux"))]
fn hostname_file() -> Option<String> {
    None
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{pid}")).is_ok()
}

#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}

fn io_error<'a>(operation: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> CalcError + 'a {
    move |e| CalcError::file_error(operation, path.display().to_string(), e.to_string())
}

fn serde_error(e: serde_json::Error) -> CalcError {
    CalcError::SerializationError {
        reason: e.to_string(),
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Holds an OS-level exclusive lock (fs2) on the sidecar file and writes
/// [`LockInfo`] into it so other users can see who has the building open.
pub struct FileLock {
    building_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a building file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(CalcError::FileLocked)` - Another user or process holds the lock
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use takeoff_core::file_io::FileLock;
    /// use std::path::Path;
    ///
    /// let lock = FileLock::acquire(Path::new("tower.qto"), "user@email.com")?;
    /// // ... edit and save ...
    /// drop(lock); // releases lock
    /// # Ok::<(), takeoff_core::errors::CalcError>(())
    /// ```
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        if let Some(existing) = FileLock::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        // Leave a live holder's sidecar intact until the OS lock is ours
        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;
        lock_file.set_len(0).map_err(io_error("truncate lock", &lock_path))?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(serde_error)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(io_error("write lock", &lock_path))?;
        lock_file.sync_all().map_err(io_error("sync lock", &lock_path))?;

        debug!(path = %path.display(), user = %info.user_id, "acquired building lock");

        Ok(FileLock {
            building_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock on `path`, if any. Stale and unreadable locks count as free.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !info.is_stale())
    }

    pub fn building_path(&self) -> &Path {
        &self.building_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock is released when _lock_file is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `tower.qto` → `tower.qto.lock`
fn lock_path_for(building_path: &Path) -> PathBuf {
    let mut lock_path = building_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(io_error("read lock", lock_path))?;
    serde_json::from_str(&contents).map_err(serde_error)
}

/// Save a building to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize building to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp to the target (atomic on most filesystems)
///
/// # Example
///
/// ```rust,no_run
/// use takeoff_core::file_io::save_building;
/// use takeoff_core::building::Building;
/// use std::path::Path;
///
/// let building = Building::new("Warehouse");
/// save_building(&building, Path::new("warehouse.qto"))?;
/// # Ok::<(), takeoff_core::errors::CalcError>(())
/// ```
pub fn save_building(building: &Building, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(building).map_err(serde_error)?;

    let tmp_path = path.with_extension("qto.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(io_error("write temp file", &tmp_path))?;
    tmp_file.sync_all().map_err(io_error("sync temp file", &tmp_path))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // Clean up temp file if rename fails
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), floors = building.floors.len(), "saved building");
    Ok(())
}

/// Load a building from a file.
///
/// # Returns
///
/// * `Ok(Building)` - Successfully loaded building
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_building(path: &Path) -> CalcResult<Building> {
    let mut file = File::open(path).map_err(io_error("open", path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(io_error("read", path))?;

    let building: Building =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&building.meta.version)?;

    debug!(path = %path.display(), floors = building.floors.len(), "loaded building");
    Ok(building)
}

/// Load a building, returning whether it's read-only due to a lock.
///
/// # Returns
///
/// * `Ok((Building, None))` - Loaded successfully, no lock
/// * `Ok((Building, Some(LockInfo)))` - Loaded, but another user has the lock
/// * `Err(_)` - Failed to load
pub fn load_building_with_lock_check(path: &Path) -> CalcResult<(Building, Option<LockInfo>)> {
    let building = load_building(path)?;
    let lock_info = FileLock::check(path);
    Ok((building, lock_info))
}

/// `major.minor.patch` parsed leniently; missing parts count as 0.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.').map(|p| p.trim().parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = match parts.next() {
        Some(part) => part.ok()?,
        None => 0,
    };
    Some((major, minor))
}

/// Accept files with the same major version. While the major is 0, files
/// from a newer minor are refused too.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (file_major, file_minor) = parse_version(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse_version(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Floor;
    use crate::grid::GridSystem;
    use std::env::temp_dir;

    fn temp_building_path(name: &str) -> PathBuf {
        temp_dir().join(format!("takeoff_test_{}.qto", name))
    }

    #[test]
    fn test_lock_path_generation() {
        let building_path = Path::new("/path/to/tower.qto");
        let lock_path = lock_path_for(building_path);
        assert_eq!(lock_path, Path::new("/path/to/tower.qto.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_building_path("roundtrip");

        let mut building = Building::new("Test Building");
        let mut floor = Floor::new("GF", 0, "Ground", GridSystem::uniform(2, 3, 4.0, 5.0));
        floor.assign_column(1, 2, "C1").unwrap();
        building.add_floor(floor);
        save_building(&building, &path).unwrap();

        let loaded = load_building(&path).unwrap();
        assert_eq!(loaded, building);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_building_path("atomic");
        let tmp_path = path.with_extension("qto.tmp");

        save_building(&Building::new("Atomic"), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_building_path("newer_schema");
        let mut building = Building::new("Future");
        building.meta.version = "0.9.0".to_string();
        save_building(&building, &path).unwrap();

        let err = load_building(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_building_path("invalid_json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_building(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_building_path("lock_test");

        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert_eq!(lock.building_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);

        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());

        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());

        assert!(validate_version("1.0.0").is_err());

        // Newer minor (in 0.x) should fail
        assert!(validate_version("0.2.0").is_err());

        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("someone@example.com");
        assert!(!info.is_stale());
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_stale_lock_file_is_ignored() {
        let path = temp_building_path("stale_lock");
        let mut info = LockInfo::new("gone@example.com");
        info.locked_at = Utc::now() - chrono::Duration::hours(48);
        fs::write(lock_path_for(&path), serde_json::to_string(&info).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_none());
        let lock = FileLock::acquire(&path, "me@example.com").unwrap();
        assert_eq!(lock.info.user_id, "me@example.com");

        drop(lock);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_failed_acquire_keeps_holder_info() {
        let path = temp_building_path("held_stale_looking");
        let lock_path = lock_path_for(&path);

        // Holder looks stale by age but still owns the OS lock
        let mut info = LockInfo::new("holder@example.com");
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        let contents = serde_json::to_string(&info).unwrap();
        let mut holder = File::create(&lock_path).unwrap();
        holder.write_all(contents.as_bytes()).unwrap();
        holder.try_lock_exclusive().unwrap();

        let err = FileLock::acquire(&path, "intruder@example.com").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert_eq!(fs::read_to_string(&lock_path).unwrap(), contents);

        drop(holder);
        let _ = fs::remove_file(&lock_path);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_hostname_falls_back_to_etc_hostname() {
        let from_file = fs::read_to_string("/etc/hostname").unwrap_or_default();
        if !from_file.trim().is_empty() {
            assert!(hostname().is_some());
        }
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_building_path("lock_check");

        save_building(&Building::new("Lock Check"), &path).unwrap();

        let (loaded, lock_info) = load_building_with_lock_check(&path).unwrap();
        assert_eq!(loaded.name, "Lock Check");
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }
}

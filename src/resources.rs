use std::env;
use std::ffi;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "Failed to read CString from file that contains 0")]
    FileContainsNil,
    #[fail(display = "File is not valid UTF-8")]
    InvalidUtf8,
    #[fail(display = "Failed get executable path")]
    FailedToGetExePath,
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Self {
        Error::Io(other)
    }
}

/// A directory of named text resources, addressed with `/`-separated names.
pub struct Resources {
    root_path: PathBuf,
}

impl Resources {
    pub fn from_path<P: Into<PathBuf>>(root_path: P) -> Resources {
        Resources {
            root_path: root_path.into(),
        }
    }

    /// Roots the resources at `rel_path` next to the running executable.
    pub fn from_relative_exe_path(rel_path: &Path) -> Result<Resources, Error> {
        let exe_file_name = env::current_exe().map_err(|_| Error::FailedToGetExePath)?;
        let exe_path = exe_file_name.parent().ok_or(Error::FailedToGetExePath)?;

        Ok(Resources::from_path(exe_path.join(rel_path)))
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn resolve(&self, resource_name: &str) -> PathBuf {
        resource_name_to_path(&self.root_path, resource_name)
    }

    pub fn load_string(&self, resource_name: &str) -> Result<String, Error> {
        let path = self.resolve(resource_name);
        debug!("loading resource {} from {}", resource_name, path.display());
        read_to_string(&path)
    }

    pub fn load_cstring(&self, resource_name: &str) -> Result<ffi::CString, Error> {
        let path = self.resolve(resource_name);
        debug!("loading resource {} from {}", resource_name, path.display());
        read_to_cstring(&path)
    }
}

pub fn read_to_string(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}

pub fn read_to_cstring(path: &Path) -> Result<ffi::CString, Error> {
    let text = read_to_string(path)?;
    ffi::CString::new(text).map_err(|_| Error::FileContainsNil)
}

fn resource_name_to_path(root_dir: &Path, location: &str) -> PathBuf {
    let mut path: PathBuf = root_dir.into();

    for part in location.split('/').filter(|part| !part.is_empty()) {
        path = path.join(part);
    }

    path
}

//! ファイルベースの KeyValueStore 実装
//!
//! ディレクトリ配下にキーごとに 1 ファイル（`<key>.json`）を置く素朴な
//! 実装。ブラウザの localStorage に相当する、プロセス再起動をまたぐ
//! 永続化を提供します。

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// ディレクトリ配下のファイルをストレージとして使う KeyValueStore
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// 指定ディレクトリを使う FileStore を作成（ディレクトリは無ければ作成）
    ///
    /// # Arguments
    ///
    /// * `dir` - 値ファイルを置くディレクトリ
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

//! One JSON record per accepted generation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use forge_primitives::{GenerationRequest, ResponseEnvelope};
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::{StoreError, StoreResult};

const RECORD_TIME_FORMAT: &str = "%d%m%Y%H%M%S";
const MAX_SUFFIX: u32 = 1000;

#[derive(Serialize)]
struct ResultRecord<'a> {
    results: &'a ResponseEnvelope,
    tweets: Vec<&'a str>,
    tags: &'a [String],
}

/// Writes generation records into a results directory.
///
/// The directory is created on first use. Records are named after the local
/// time of the write; a second record in the same second gets a numeric
/// suffix instead of replacing the first.
#[derive(Clone, Debug)]
pub struct ResultPersister {
    dir: PathBuf,
}

impl ResultPersister {
    /// Creates a persister writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the results directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `{results, tweets, tags}` for one request and returns the file path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory or file cannot be created, or
    /// when every suffixed name for this second is already taken.
    pub async fn persist<Tz>(
        &self,
        envelope: &ResponseEnvelope,
        request: &GenerationRequest,
        at: &DateTime<Tz>,
    ) -> StoreResult<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let record = ResultRecord {
            results: envelope,
            tweets: request.tweet_texts(),
            tags: request.tags(),
        };
        let stamp = at.format(RECORD_TIME_FORMAT).to_string();
        let data =
            serde_json::to_vec(&record).map_err(|err| StoreError::serialization(&self.dir, err))?;

        self.ensure_dir().await?;

        for suffix in 0..MAX_SUFFIX {
            let path = self.record_path(&stamp, suffix);
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match file {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "record name taken, trying next suffix");
                    continue;
                }
                Err(err) => return Err(StoreError::io(path, err)),
            };

            file.write_all(&data)
                .await
                .map_err(|err| StoreError::io(&path, err))?;
            file.flush().await.map_err(|err| StoreError::io(&path, err))?;
            info!(path = %path.display(), "results saved");
            return Ok(path);
        }

        Err(StoreError::NameExhausted {
            dir: self.dir.clone(),
            stamp,
        })
    }

    async fn ensure_dir(&self) -> StoreResult<()> {
        let exists = fs::try_exists(&self.dir)
            .await
            .map_err(|err| StoreError::io(&self.dir, err))?;
        if !exists {
            fs::create_dir_all(&self.dir)
                .await
                .map_err(|err| StoreError::io(&self.dir, err))?;
            info!(path = %self.dir.display(), "created results directory");
        }
        Ok(())
    }

    fn record_path(&self, stamp: &str, suffix: u32) -> PathBuf {
        if suffix == 0 {
            self.dir.join(format!("{stamp}.json"))
        } else {
            self.dir.join(format!("{stamp}-{suffix}.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use forge_primitives::{TopicMap, Tweet};
    use serde_json::Value;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir()
            .join(format!("forge-results-{}", Uuid::new_v4()))
            .join("outputs")
    }

    fn fixed_time() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
            .and_utc()
    }

    fn sample() -> (ResponseEnvelope, GenerationRequest) {
        let topics: TopicMap = [("🧠 Launch", "We shipped")].into_iter().collect();
        let envelope = ResponseEnvelope::generated(topics, "prompt", "[\"hello\"]");
        let request = GenerationRequest::new("Write posts")
            .with_tags(["jina"])
            .with_tweets(vec![Tweet::new("1", "ana", "hello")]);
        (envelope, request)
    }

    #[tokio::test]
    async fn writes_record_named_after_the_second() {
        let dir = temp_dir();
        let persister = ResultPersister::new(&dir);
        let (envelope, request) = sample();

        let path = persister.persist(&envelope, &request, &fixed_time()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "09032024140507.json");

        let record: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(record["tweets"], serde_json::json!(["hello"]));
        assert_eq!(record["tags"], serde_json::json!(["jina"]));
        assert_eq!(record["results"]["🧠 Launch"], "We shipped");

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test]
    async fn same_second_records_do_not_overwrite() {
        let dir = temp_dir();
        let persister = ResultPersister::new(&dir);
        let (envelope, request) = sample();

        let first = persister.persist(&envelope, &request, &fixed_time()).await.unwrap();
        let second = persister.persist(&envelope, &request, &fixed_time()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "09032024140507-1.json");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }
}

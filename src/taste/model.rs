use crate::error::io_error;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The value a user assigned to an item.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: i64,
    pub item_id: i64,
    pub value: f32,
}
impl Preference {
    pub fn new(user_id: i64, item_id: i64, value: f32) -> Self {
        Self { user_id, item_id, value }
    }
}

/// Read access to all known preferences.
pub trait DataModel {
    /// All users, ascending.
    fn user_ids(&self) -> Vec<i64>;
    /// All items any user rated, ascending.
    fn item_ids(&self) -> Vec<i64>;
    /// Preferences of **user_id**, ordered by item id.
    /// Fails with [`Error::NoSuchUser`] for unknown users.
    fn preferences_from_user(&self, user_id: i64) -> Result<&[Preference]>;
    fn num_users(&self) -> usize;
    fn num_items(&self) -> usize;
    /// Smallest preference value within the model, `NaN` for an empty model.
    fn min_preference(&self) -> f32;
    /// Largest preference value within the model, `NaN` for an empty model.
    fn max_preference(&self) -> f32;

    /// The value **user_id** assigned to **item_id**, if any.
    fn preference_value(&self, user_id: i64, item_id: i64) -> Result<Option<f32>> {
        let prefs = self.preferences_from_user(user_id)?;
        Ok(prefs.binary_search_by_key(&item_id, |p| p.item_id).ok().map(|idx| prefs[idx].value))
    }
}


/// Data model holding all preferences in memory.
#[derive(Clone, Debug)]
pub struct GenericDataModel {
    users: BTreeMap<i64, Vec<Preference>>,
    items: BTreeSet<i64>,
    min_preference: f32,
    max_preference: f32,
}
impl GenericDataModel {
    /// Build a model from **preferences**. When a user rated the same item more than once, the last
    /// preference wins.
    pub fn new<I: IntoIterator<Item = Preference>>(preferences: I) -> Self {
        let mut by_user: BTreeMap<i64, BTreeMap<i64, Preference>> = BTreeMap::new();
        for pref in preferences {
            by_user.entry(pref.user_id).or_default().insert(pref.item_id, pref);
        }

        let mut items = BTreeSet::new();
        let (mut min_preference, mut max_preference) = (f32::INFINITY, f32::NEG_INFINITY);
        let users: BTreeMap<i64, Vec<Preference>> = by_user.into_iter()
            .map(|(user_id, prefs)| {
                let prefs: Vec<Preference> = prefs.into_values().collect();
                for p in &prefs {
                    items.insert(p.item_id);
                    min_preference = min_preference.min(p.value);
                    max_preference = max_preference.max(p.value);
                }
                (user_id, prefs)
            })
            .collect();
        if users.is_empty() {
            min_preference = f32::NAN;
            max_preference = f32::NAN;
        }
        Self { users, items, min_preference, max_preference }
    }
}
impl DataModel for GenericDataModel {
    fn user_ids(&self) -> Vec<i64> { self.users.keys().cloned().collect() }
    fn item_ids(&self) -> Vec<i64> { self.items.iter().cloned().collect() }

    fn preferences_from_user(&self, user_id: i64) -> Result<&[Preference]> {
        self.users.get(&user_id)
            .map(|prefs| prefs.as_slice())
            .ok_or(Error::NoSuchUser(user_id))
    }

    fn num_users(&self) -> usize { self.users.len() }
    fn num_items(&self) -> usize { self.items.len() }
    fn min_preference(&self) -> f32 { self.min_preference }
    fn max_preference(&self) -> f32 { self.max_preference }
}


/// Data model loaded from a ratings file.
///
/// Every non-empty line that does not start with `#` holds `user,item,preference[,timestamp]`, separated by
/// commas or (if the first data line contains one) tabs. An empty preference removes an earlier preference
/// of that user for that item.
#[derive(Clone, Debug)]
pub struct FileDataModel {
    path: PathBuf,
    delegate: GenericDataModel,
    timestamps: HashMap<(i64, i64), i64>,
}
impl FileDataModel {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(io_error(path))?;
        let delimiter = match content.lines().map(str::trim).find(|l| !l.is_empty() && !l.starts_with('#')) {
            Some(line) if line.contains('\t') => b'\t',
            _ => b',',
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut ratings: BTreeMap<(i64, i64), f32> = BTreeMap::new();
        let mut timestamps = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() < 3 {
                return Err(Error::InvalidRating { line, reason: format!("expected at least 3 fields, got {}", record.len()) });
            }
            let user_id: i64 = parse_field(&record[0], line, "user id")?;
            let item_id: i64 = parse_field(&record[1], line, "item id")?;
            if record[2].is_empty() {
                debug!(user_id, item_id, line, "preference removed");
                ratings.remove(&(user_id, item_id));
                timestamps.remove(&(user_id, item_id));
                continue;
            }
            ratings.insert((user_id, item_id), parse_field(&record[2], line, "preference")?);
            if let Some(timestamp) = record.get(3).filter(|t| !t.is_empty()) {
                timestamps.insert((user_id, item_id), parse_field(timestamp, line, "timestamp")?);
            }
        }

        let delegate = GenericDataModel::new(
            ratings.into_iter().map(|((user_id, item_id), value)| Preference::new(user_id, item_id, value)));
        info!(path = %path.display(), users = delegate.num_users(), items = delegate.num_items(), "ratings loaded");
        Ok(Self { path: path.to_path_buf(), delegate, timestamps })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Timestamp given with the preference of **user_id** for **item_id**, if any.
    pub fn preference_time(&self, user_id: i64, item_id: i64) -> Option<i64> {
        self.timestamps.get(&(user_id, item_id)).cloned()
    }
}
impl DataModel for FileDataModel {
    fn user_ids(&self) -> Vec<i64> { self.delegate.user_ids() }
    fn item_ids(&self) -> Vec<i64> { self.delegate.item_ids() }
    fn preferences_from_user(&self, user_id: i64) -> Result<&[Preference]> { self.delegate.preferences_from_user(user_id) }
    fn num_users(&self) -> usize { self.delegate.num_users() }
    fn num_items(&self) -> usize { self.delegate.num_items() }
    fn min_preference(&self) -> f32 { self.delegate.min_preference() }
    fn max_preference(&self) -> f32 { self.delegate.max_preference() }
}

fn parse_field<F: std::str::FromStr>(field: &str, line: u64, what: &str) -> Result<F>
        where F::Err: std::fmt::Display {
    field.parse().map_err(|e| Error::InvalidRating { line, reason: format!("bad {} {:?}: {}", what, field, e) })
}

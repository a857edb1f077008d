//! Test doubles shared by the unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::criteria::Criteria;
use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::storage::Record;
use crate::strategy::StoreKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub model: String,
    pub year: u16,
}

impl Car {
    pub fn new(id: &str, model: &str, year: u16) -> Self {
        Self {
            id: id.to_string(),
            model: model.to_string(),
            year,
        }
    }
}

impl Record for Car {
    fn id(&self) -> String {
        self.id.clone()
    }
}

pub fn catalogue() -> Vec<Car> {
    vec![
        Car::new("001", "Peugeot 508", 2011),
        Car::new("002", "Jaguar", 1998),
        Car::new("005", "Mazda", 2002),
        Car::new("006", "BMW M3", 2002),
    ]
}

#[derive(Error, Debug)]
#[error("{kind} store is down")]
pub struct StoreDown {
    pub kind: StoreKind,
}

/// Calls seen by a [`RecordingRepository`]
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub find: usize,
    pub find_one: usize,
    pub store: usize,
    pub store_one: usize,
    pub update: usize,
    pub update_one: usize,
    pub remove: usize,
    pub store_or_update: usize,
    pub last_criteria: Option<Criteria>,
    pub last_models: Option<Vec<Car>>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.find
            + self.find_one
            + self.store
            + self.store_one
            + self.update
            + self.update_one
            + self.remove
            + self.store_or_update
    }
}

/// Repository double that records every call
///
/// Reads return the seeded cars, writes echo their input. `set_failing`
/// makes every operation except `store_or_update` fail; `set_sync_failing`
/// makes `store_or_update` fail. With `set_echo(false)` writes succeed
/// without data.
pub struct RecordingRepository {
    kind: StoreKind,
    cars: Mutex<Vec<Car>>,
    failing: AtomicBool,
    sync_failing: AtomicBool,
    echo: AtomicBool,
    calls: Mutex<Calls>,
}

impl RecordingRepository {
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            cars: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            sync_failing: AtomicBool::new(false),
            echo: AtomicBool::new(true),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn failing(kind: StoreKind) -> Self {
        let repository = Self::new(kind);
        repository.set_failing(true);
        repository
    }

    pub fn seeded(kind: StoreKind, cars: Vec<Car>) -> Self {
        let repository = Self::new(kind);
        *repository.cars.lock().unwrap() = cars;
        repository
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_sync_failing(&self, failing: bool) {
        self.sync_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }

    fn fails(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    fn down<D>(&self) -> Outcome<D> {
        Outcome::failure(self.kind, crate::Error::repository(StoreDown { kind: self.kind }))
    }

    fn write<D>(&self, data: D) -> Outcome<D> {
        if self.fails() {
            self.down()
        } else if self.echo.load(Ordering::SeqCst) {
            Outcome::success(self.kind, data)
        } else {
            Outcome::empty(self.kind)
        }
    }
}

#[async_trait]
impl Repository<Car> for RecordingRepository {
    async fn find(&self, criteria: &Criteria) -> Outcome<Vec<Car>> {
        self.record(|calls| {
            calls.find += 1;
            calls.last_criteria = Some(criteria.clone());
        });
        if self.fails() {
            return self.down();
        }
        let cars = self.cars.lock().unwrap().clone();
        Outcome::success(self.kind, cars)
    }

    async fn find_one(&self, criteria: &Criteria) -> Outcome<Car> {
        self.record(|calls| {
            calls.find_one += 1;
            calls.last_criteria = Some(criteria.clone());
        });
        if self.fails() {
            return self.down();
        }
        match self.cars.lock().unwrap().first().cloned() {
            Some(car) => Outcome::success(self.kind, car),
            None => Outcome::empty(self.kind),
        }
    }

    async fn store(&self, models: Vec<Car>) -> Outcome<Vec<Car>> {
        self.record(|calls| {
            calls.store += 1;
            calls.last_models = Some(models.clone());
        });
        self.write(models)
    }

    async fn store_one(&self, model: Car) -> Outcome<Car> {
        self.record(|calls| {
            calls.store_one += 1;
            calls.last_models = Some(vec![model.clone()]);
        });
        self.write(model)
    }

    async fn update(&self, models: Vec<Car>) -> Outcome<Vec<Car>> {
        self.record(|calls| {
            calls.update += 1;
            calls.last_models = Some(models.clone());
        });
        self.write(models)
    }

    async fn update_one(&self, model: Car) -> Outcome<Car> {
        self.record(|calls| {
            calls.update_one += 1;
            calls.last_models = Some(vec![model.clone()]);
        });
        self.write(model)
    }

    async fn remove(&self, models: Vec<Car>) -> Outcome<Vec<Car>> {
        self.record(|calls| {
            calls.remove += 1;
            calls.last_models = Some(models.clone());
        });
        self.write(models)
    }

    async fn store_or_update(&self, models: Vec<Car>) -> Outcome<Vec<Car>> {
        self.record(|calls| {
            calls.store_or_update += 1;
            calls.last_models = Some(models.clone());
        });
        if self.sync_failing.load(Ordering::SeqCst) {
            return self.down();
        }
        Outcome::success(self.kind, models)
    }
}

//! Car command handlers
//!
//! Every command goes through the registry, so the configured strategy
//! decides which store answers and whether the other one is kept in sync.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use evoke_core::Criteria;

use crate::commands::ensure_ok;
use crate::models::Car;
use crate::output::Output;
use crate::stores::Stores;

/// List cars, optionally filtered by model and year
pub async fn list(
    stores: &Stores,
    model: Option<String>,
    year: Option<u16>,
    output: &Output,
) -> Result<()> {
    let mut criteria = Criteria::new();
    if let Some(model) = model {
        criteria.insert("model", model);
    }
    if let Some(year) = year {
        criteria.insert("year", year);
    }

    let outcome = stores.registry.find::<Car>(criteria).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome)
}

/// Show a single car
pub async fn show(stores: &Stores, id: String, output: &Output) -> Result<()> {
    let outcome = stores.registry.find_one::<Car>(by_id(&id)).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome)?;

    if outcome.data.is_none() {
        bail!("Car not found: {}", id);
    }
    Ok(())
}

/// Add a new car
pub async fn add(stores: &Stores, model: String, year: u16, output: &Output) -> Result<()> {
    let car = Car::new(model, year);
    let id = car.id.clone();

    let outcome = stores.registry.store_one(car).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome).context("Failed to add car")?;

    output.success(&format!("Added car: {}", id));
    Ok(())
}

/// Import cars from a JSON array file
pub async fn import(stores: &Stores, path: &Path, output: &Output) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {:?}", path))?;
    let cars: Vec<Car> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {:?}", path))?;

    if cars.is_empty() {
        output.message("Nothing to import.");
        return Ok(());
    }

    let count = cars.len();
    let outcome = stores.registry.store(cars).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome).context("Failed to import cars")?;

    output.success(&format!("Imported {} car(s)", count));
    Ok(())
}

/// Change a car's model and/or year
pub async fn edit(
    stores: &Stores,
    id: String,
    model: Option<String>,
    year: Option<u16>,
    output: &Output,
) -> Result<()> {
    if model.is_none() && year.is_none() {
        bail!("Nothing to change. Pass --model and/or --year.");
    }

    let mut car = fetch(stores, &id).await?;
    if let Some(model) = model {
        car.model = model;
    }
    if let Some(year) = year {
        car.year = year;
    }

    let outcome = stores.registry.update_one(car).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome).context("Failed to update car")?;

    output.success("Car updated");
    Ok(())
}

/// Remove a car
pub async fn remove(stores: &Stores, id: String, output: &Output) -> Result<()> {
    let car = fetch(stores, &id).await?;

    let outcome = stores.registry.remove_one(car).await;
    output.print_outcome(&outcome);
    ensure_ok(&outcome).context("Failed to remove car")?;

    output.success(&format!("Removed car: {}", id));
    Ok(())
}

fn by_id(id: &str) -> Criteria {
    Criteria::new().with("id", id)
}

/// Look a car up through the registry before changing it
async fn fetch(stores: &Stores, id: &str) -> Result<Car> {
    let outcome = stores.registry.find_one::<Car>(by_id(id)).await;
    ensure_ok(&outcome).with_context(|| format!("Failed to look up car {}", id))?;
    outcome.data.ok_or_else(|| anyhow!("Car not found: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use evoke_core::{Config, Repository, StoreKind};
    use tempfile::TempDir;

    fn open(temp_dir: &TempDir, offline: bool) -> Stores {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        Stores::open(&config, offline)
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[tokio::test]
    async fn test_added_car_round_trips_with_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let stores = open(&temp_dir, false);

        add(&stores, "Mazda".to_string(), 2002, &quiet())
            .await
            .unwrap();
        let car = stores.local.records().await.unwrap().remove(0);
        assert_eq!(stores.remote.records().await.unwrap(), vec![car.clone()]);

        show(&stores, car.id.clone(), &quiet()).await.unwrap();
        list(&stores, Some("Mazda".to_string()), None, &quiet())
            .await
            .unwrap();

        edit(&stores, car.id.clone(), None, Some(2003), &quiet())
            .await
            .unwrap();
        assert_eq!(stores.local.records().await.unwrap()[0].year, 2003);
        assert_eq!(stores.remote.records().await.unwrap()[0].year, 2003);

        remove(&stores, car.id.clone(), &quiet()).await.unwrap();
        assert!(stores.local.records().await.unwrap().is_empty());
        assert!(stores.remote.records().await.unwrap().is_empty());
        assert!(show(&stores, car.id, &quiet()).await.is_err());
    }

    #[tokio::test]
    async fn test_import_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let stores = open(&temp_dir, false);
        let file = temp_dir.path().join("cars.json");
        std::fs::write(
            &file,
            r#"[{"model": "Jaguar", "year": 1998}, {"model": "BMW M3", "year": 2002}]"#,
        )
        .unwrap();

        import(&stores, &file, &quiet()).await.unwrap();

        assert_eq!(stores.local.records().await.unwrap().len(), 2);
        list(&stores, None, Some(2002), &quiet()).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_requires_a_change() {
        let temp_dir = TempDir::new().unwrap();
        let stores = open(&temp_dir, false);

        let err = edit(&stores, "001".to_string(), None, None, &quiet())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Nothing to change"));
    }

    #[tokio::test]
    async fn test_offline_edit_and_remove_use_local() {
        let temp_dir = TempDir::new().unwrap();
        let stores = open(&temp_dir, true);
        let car = Car::new("Peugeot 508", 2011);
        stores.local.store(vec![car.clone()]).await;

        edit(
            &stores,
            car.id.clone(),
            Some("Peugeot 508 SW".to_string()),
            None,
            &quiet(),
        )
        .await
        .unwrap();
        let edited = stores.local.records().await.unwrap();
        assert_eq!(edited[0].model, "Peugeot 508 SW");

        remove(&stores, car.id.clone(), &quiet()).await.unwrap();
        assert!(stores.local.records().await.unwrap().is_empty());
        assert!(!stores.store(StoreKind::Remote).is_available());
    }

    #[tokio::test]
    async fn test_remove_unknown_car() {
        let temp_dir = TempDir::new().unwrap();
        let stores = open(&temp_dir, true);

        let err = remove(&stores, "404".to_string(), &quiet())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Car not found"));
    }
}

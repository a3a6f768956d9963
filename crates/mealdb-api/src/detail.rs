//! Meal detail lookups (`lookup.php`)

use crate::client::MealApi;
use crate::error::DetailError;
use crate::meal::Meal;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Fetch a single meal by id
pub fn fetch_detail(api: &dyn MealApi, id: &str) -> Result<Meal, DetailError> {
    match api.lookup(id) {
        Ok(Some(meal)) => Ok(meal),
        Ok(None) => Err(DetailError::NotFound),
        Err(e) => {
            log::warn!("Lookup of meal {} failed: {}", id, e);
            Err(DetailError::Network(e))
        }
    }
}

#[derive(Debug)]
pub struct DetailRequest {
    pub meal_id: String,
}

#[derive(Debug)]
pub struct DetailResponse {
    pub meal_id: String,
    pub result: Result<Meal, DetailError>,
}

/// Spawn the detail worker thread (fetches the selected meal on demand)
pub fn spawn_detail_worker(
    api: Arc<dyn MealApi>,
    req_rx: Receiver<DetailRequest>,
    resp_tx: Sender<DetailResponse>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(mut req) = req_rx.recv() {
            // Coalesce rapid selection changes - keep only the latest request
            while let Ok(next) = req_rx.try_recv() {
                req = next;
            }

            let result = fetch_detail(api.as_ref(), &req.meal_id);
            if resp_tx
                .send(DetailResponse {
                    meal_id: req.meal_id,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    })
}

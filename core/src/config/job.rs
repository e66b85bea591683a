use std::{fs::File, io::BufReader, path::Path};

use itertools::Itertools;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    generator::GenerationRequest,
    operator::Operator,
};

/// A list of generation jobs as found in a config file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigJobs {
    pub jobs: Vec<ConfigJob>,
}

/// One integral family up to a maximum angular momentum per center.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigJob {
    /// Operator symbol or name, e.g. `T` or `kinetic-energy`.
    pub integral: String,
    pub max_angular_momentum: Vec<u32>,
    #[serde(default)]
    pub operator_order: Option<u32>,
    #[serde(default)]
    pub derivative_orders: Option<Vec<u32>>,
}

impl ConfigJobs {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| {
            Error::InvalidRequest(format!("cannot open {}: {error}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|error| {
            Error::InvalidRequest(format!("malformed job file {}: {error}", path.display()))
        })
    }

    /// Every request of every job, in job order.
    pub fn requests(self) -> Result<Vec<GenerationRequest>> {
        let mut requests = Vec::new();
        for job in self.jobs {
            requests.extend(Vec::<GenerationRequest>::try_from(job)?);
        }
        Ok(requests)
    }
}

impl TryFrom<ConfigJob> for Vec<GenerationRequest> {
    type Error = Error;

    fn try_from(job: ConfigJob) -> Result<Self> {
        let operator = job.integral.parse::<Operator>()?;

        let requests = job
            .max_angular_momentum
            .iter()
            .map(|&max| 0..=max)
            .multi_cartesian_product()
            .map(|angular_momentum| {
                let mut request = GenerationRequest::new(operator, angular_momentum);
                if let Some(order) = job.operator_order {
                    request = request.with_operator_order(order);
                }
                if let Some(orders) = &job.derivative_orders {
                    request = request.with_derivative_orders(orders.clone());
                }
                request
            })
            .collect::<Vec<_>>();

        for request in &requests {
            request.validate()?;
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigJob, ConfigJobs};
    use crate::{error::Error, generator::GenerationRequest, operator::Operator};

    #[test]
    fn jobs_enumerate_every_shell_combination() {
        let jobs: ConfigJobs = serde_json::from_str(
            r#"{
                "jobs": [
                    { "integral": "T", "max_angular_momentum": [1, 2] },
                    { "integral": "multipole", "max_angular_momentum": [0, 0], "operator_order": 2 }
                ]
            }"#,
        )
        .unwrap();

        let requests = jobs.requests().unwrap();
        assert_eq!(requests.len(), 2 * 3 + 1);
        assert_eq!(
            requests[0],
            GenerationRequest::new(Operator::KineticEnergy, vec![0, 0])
        );
        assert_eq!(
            requests[5],
            GenerationRequest::new(Operator::KineticEnergy, vec![1, 2])
        );
        assert_eq!(requests[6].operator_order, 2);
    }

    #[test]
    fn unknown_integrals_are_rejected() {
        let job = ConfigJob {
            integral: "spin-orbit".to_string(),
            max_angular_momentum: vec![1, 1],
            operator_order: None,
            derivative_orders: None,
        };

        assert_eq!(
            Vec::<GenerationRequest>::try_from(job),
            Err(Error::UnknownFamily("spin-orbit".to_string()))
        );
    }

    #[test]
    fn derivative_orders_must_match_centers() {
        let job = ConfigJob {
            integral: "eri".to_string(),
            max_angular_momentum: vec![1, 1, 1, 1],
            operator_order: None,
            derivative_orders: Some(vec![1, 0]),
        };

        assert!(matches!(
            Vec::<GenerationRequest>::try_from(job),
            Err(Error::InvalidRequest(_))
        ));
    }
}

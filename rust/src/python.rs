//! Python bindings (built with the `python` feature).
//!
//! Thin `#[pyclass]` wrappers that convert into the engine's plain Rust types;
//! engine errors surface as `ValueError`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::{NaiveDate, NaiveDateTime};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::analysis::analyze_critical_chain;
use crate::config::{AnalysisConfig, ForecastConfig};
use crate::forecast::forecast_completion;
use crate::models::{CriticalChainAnalysis, DependencyEdge, DependencyType, TaskNode};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A task snapshot entry.
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub title: String,
    #[pyo3(get, set)]
    pub optimistic_minutes: i64,
    #[pyo3(get, set)]
    pub pessimistic_minutes: i64,
    #[pyo3(get, set)]
    pub assignee_ids: Vec<String>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (id, optimistic_minutes, pessimistic_minutes, assignee_ids=Vec::new(), title=None))]
    fn new(
        id: String,
        optimistic_minutes: i64,
        pessimistic_minutes: i64,
        assignee_ids: Vec<String>,
        title: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| id.clone()),
            id,
            optimistic_minutes,
            pessimistic_minutes,
            assignee_ids,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, optimistic={}, pessimistic={}, assignees={})",
            self.id,
            self.optimistic_minutes,
            self.pessimistic_minutes,
            self.assignee_ids.len()
        )
    }
}

impl From<PyTask> for TaskNode {
    fn from(task: PyTask) -> Self {
        TaskNode {
            id: task.id,
            title: task.title,
            optimistic_minutes: task.optimistic_minutes,
            pessimistic_minutes: task.pessimistic_minutes,
            assignee_ids: task.assignee_ids,
        }
    }
}

/// A precedence constraint; `dependency_type` is one of FS, SS, FF, SF.
#[pyclass(name = "Dependency")]
#[derive(Clone, Debug)]
pub struct PyDependency {
    #[pyo3(get, set)]
    pub predecessor_id: String,
    #[pyo3(get, set)]
    pub successor_id: String,
    #[pyo3(get, set)]
    pub dependency_type: String,
    #[pyo3(get, set)]
    pub lag_minutes: i64,
}

#[pymethods]
impl PyDependency {
    #[new]
    #[pyo3(signature = (predecessor_id, successor_id, dependency_type="FS".to_string(), lag_minutes=0))]
    fn new(
        predecessor_id: String,
        successor_id: String,
        dependency_type: String,
        lag_minutes: i64,
    ) -> Self {
        Self {
            predecessor_id,
            successor_id,
            dependency_type,
            lag_minutes,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency({:?} -{}-> {:?}, lag={})",
            self.predecessor_id, self.dependency_type, self.successor_id, self.lag_minutes
        )
    }
}

impl TryFrom<PyDependency> for DependencyEdge {
    type Error = PyErr;

    fn try_from(dep: PyDependency) -> Result<Self, Self::Error> {
        let kind: DependencyType = dep.dependency_type.parse().map_err(value_error)?;
        Ok(DependencyEdge::new(
            dep.predecessor_id,
            dep.successor_id,
            kind,
            dep.lag_minutes,
        ))
    }
}

fn convert_inputs(
    tasks: Vec<PyTask>,
    dependencies: Vec<PyDependency>,
) -> PyResult<(Vec<TaskNode>, Vec<DependencyEdge>)> {
    let tasks = tasks.into_iter().map(TaskNode::from).collect();
    let edges = dependencies
        .into_iter()
        .map(DependencyEdge::try_from)
        .collect::<PyResult<Vec<_>>>()?;
    Ok((tasks, edges))
}

/// Critical-chain analysis result.
#[pyclass(name = "CriticalChainResult")]
#[derive(Clone, Debug)]
pub struct PyCriticalChainResult {
    #[pyo3(get)]
    pub critical_chain: Vec<String>,
    /// (merge_task_id, task ids)
    #[pyo3(get)]
    pub feeding_chains: Vec<(String, Vec<String>)>,
    #[pyo3(get)]
    pub project_buffer_minutes: i64,
    /// (merge_task_id, buffer minutes)
    #[pyo3(get)]
    pub feeding_buffers: Vec<(String, i64)>,
    #[pyo3(get)]
    pub total_project_duration_minutes: i64,
    /// task_id -> (early_start, early_finish, late_start, late_finish, total_float)
    #[pyo3(get)]
    pub schedule: HashMap<String, (i64, i64, i64, i64, i64)>,
    /// (predecessor_id, successor_id) of edges added by resource leveling
    #[pyo3(get)]
    pub synthetic_edges: Vec<(String, String)>,
}

#[pymethods]
impl PyCriticalChainResult {
    fn __repr__(&self) -> String {
        format!(
            "CriticalChainResult(chain={:?}, project_buffer={}, total={})",
            self.critical_chain, self.project_buffer_minutes, self.total_project_duration_minutes
        )
    }
}

impl From<CriticalChainAnalysis> for PyCriticalChainResult {
    fn from(analysis: CriticalChainAnalysis) -> Self {
        Self {
            critical_chain: analysis
                .critical_chain
                .iter()
                .map(|t| t.task_id.clone())
                .collect(),
            feeding_chains: analysis
                .feeding_chains
                .iter()
                .map(|fc| {
                    let ids = fc.tasks.iter().map(|t| t.task_id.clone()).collect();
                    (fc.merge_task_id.clone(), ids)
                })
                .collect(),
            project_buffer_minutes: analysis.project_buffer_minutes,
            feeding_buffers: analysis
                .feeding_buffers
                .iter()
                .map(|fb| (fb.merge_task_id.clone(), fb.buffer_minutes))
                .collect(),
            total_project_duration_minutes: analysis.total_project_duration_minutes,
            schedule: analysis
                .schedule
                .iter()
                .map(|t| {
                    let tm = t.timing;
                    (
                        t.task_id.clone(),
                        (
                            tm.early_start,
                            tm.early_finish,
                            tm.late_start,
                            tm.late_finish,
                            tm.total_float,
                        ),
                    )
                })
                .collect(),
            synthetic_edges: analysis
                .synthetic_edges
                .iter()
                .map(|e| (e.predecessor_id.clone(), e.successor_id.clone()))
                .collect(),
        }
    }
}

/// Monte Carlo forecast result.
#[pyclass(name = "ForecastResult")]
#[derive(Clone, Debug)]
pub struct PyForecastResult {
    #[pyo3(get)]
    pub start_date: Option<NaiveDate>,
    #[pyo3(get)]
    pub deterministic_duration_minutes: i64,
    #[pyo3(get)]
    pub deterministic_finish_date: Option<NaiveDate>,
    #[pyo3(get)]
    pub simulations: usize,
    #[pyo3(get)]
    pub seed: u64,
    /// "p50".."p95" -> (duration_minutes, finish_date)
    #[pyo3(get)]
    pub percentiles: HashMap<String, (i64, Option<NaiveDate>)>,
    /// (min_minutes, max_minutes, count) per bin
    #[pyo3(get)]
    pub histogram: Vec<(i64, i64, usize)>,
}

#[pymethods]
impl PyForecastResult {
    fn __repr__(&self) -> String {
        format!(
            "ForecastResult(simulations={}, deterministic={}, seed={})",
            self.simulations, self.deterministic_duration_minutes, self.seed
        )
    }
}

/// Run a critical-chain analysis.
///
/// Raises ValueError for an empty project, a project without dependencies,
/// an unknown dependency type, or a cyclic graph.
#[pyfunction]
#[pyo3(name = "analyze_critical_chain", signature = (tasks, dependencies, verbosity=0))]
fn py_analyze_critical_chain(
    tasks: Vec<PyTask>,
    dependencies: Vec<PyDependency>,
    verbosity: u8,
) -> PyResult<PyCriticalChainResult> {
    let (tasks, edges) = convert_inputs(tasks, dependencies)?;
    let config = AnalysisConfig { verbosity };
    analyze_critical_chain(&tasks, &edges, &config)
        .map(PyCriticalChainResult::from)
        .map_err(value_error)
}

/// Forecast completion by Monte Carlo simulation.
///
/// Raises ValueError for an invalid simulation count or invalid project data.
#[pyfunction]
#[pyo3(
    name = "forecast_completion",
    signature = (tasks, dependencies, simulations=1000, seed=None, start=None, parallel=false, verbosity=0)
)]
#[allow(clippy::too_many_arguments)]
fn py_forecast_completion(
    tasks: Vec<PyTask>,
    dependencies: Vec<PyDependency>,
    simulations: usize,
    seed: Option<u64>,
    start: Option<NaiveDateTime>,
    parallel: bool,
    verbosity: u8,
) -> PyResult<PyForecastResult> {
    let (tasks, edges) = convert_inputs(tasks, dependencies)?;
    let config = ForecastConfig {
        simulations,
        seed,
        parallel,
        start,
        verbosity,
    };
    let result = forecast_completion(&tasks, &edges, &config).map_err(value_error)?;

    Ok(PyForecastResult {
        start_date: result.start_date,
        deterministic_duration_minutes: result.deterministic_duration_minutes,
        deterministic_finish_date: result.deterministic_finish_date,
        simulations: result.simulations,
        seed: result.seed,
        percentiles: result
            .percentiles
            .entries()
            .iter()
            .map(|(percent, e)| (format!("p{percent}"), (e.duration_minutes, e.finish_date)))
            .collect(),
        histogram: result
            .histogram
            .iter()
            .map(|b| (b.min_minutes, b.max_minutes, b.count))
            .collect(),
    })
}

/// The ccpm_rust Python module.
#[pymodule]
fn ccpm_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_class::<PyDependency>()?;
    m.add_class::<PyCriticalChainResult>()?;
    m.add_class::<PyForecastResult>()?;

    m.add_function(wrap_pyfunction!(py_analyze_critical_chain, m)?)?;
    m.add_function(wrap_pyfunction!(py_forecast_completion, m)?)?;

    Ok(())
}

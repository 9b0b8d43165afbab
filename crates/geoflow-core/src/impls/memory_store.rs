//! In-memory repository (development and tests).
//!
//! All state lives behind one `tokio::sync::Mutex`, so every trait method is
//! atomic with respect to the others. That is what makes `save_tasks`
//! batch-atomic and `claim` a real compare-and-swap.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    NewTask, NewWorkflow, StoreError, TaskId, TaskRecord, WorkflowId, WorkflowRecord,
};
use crate::ports::{Clock, IdGenerator, Repository, SystemClock, TaskQuery, UlidGenerator};

struct StoredTask {
    /// Insertion sequence, used to keep ties in creation order.
    seq: u64,
    record: TaskRecord,
}

#[derive(Default)]
struct InMemoryState {
    workflows: HashMap<WorkflowId, WorkflowRecord>,
    tasks: HashMap<TaskId, StoredTask>,
    next_seq: u64,
}

impl InMemoryState {
    fn insert_task(&mut self, record: TaskRecord) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert(record.task_id, StoredTask { seq, record });
    }
}

pub struct InMemoryRepository {
    state: Mutex<InMemoryState>,
    id_gen: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(UlidGenerator::new(SystemClock)),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(id_gen: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
            id_gen,
            clock,
        }
    }

    /// Number of stored tasks (for assertions).
    pub async fn task_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save_workflow(&self, workflow: NewWorkflow) -> Result<WorkflowRecord, StoreError> {
        let record = WorkflowRecord::from_new(
            self.id_gen.generate_workflow_id(),
            workflow,
            self.clock.now(),
        );
        let mut state = self.state.lock().await;
        state.workflows.insert(record.workflow_id, record.clone());
        Ok(record)
    }

    async fn update_workflow(&self, workflow: &WorkflowRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let Some(slot) = state.workflows.get_mut(&workflow.workflow_id) else {
            return Err(StoreError::WorkflowNotFound(workflow.workflow_id));
        };
        *slot = workflow.clone();
        Ok(())
    }

    async fn find_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Option<WorkflowRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.workflows.get(&workflow_id).cloned())
    }

    async fn save_tasks(&self, tasks: Vec<NewTask>) -> Result<Vec<TaskRecord>, StoreError> {
        let mut state = self.state.lock().await;

        // Validate the whole batch before writing anything.
        for task in &tasks {
            if !state.workflows.contains_key(&task.workflow_id) {
                return Err(StoreError::WorkflowNotFound(task.workflow_id));
            }
            if let Some(dependency) = task.depends_on
                && !state.tasks.contains_key(&dependency)
            {
                return Err(StoreError::DanglingDependency { dependency });
            }
        }

        let now = self.clock.now();
        let mut saved = Vec::with_capacity(tasks.len());
        for task in tasks {
            let record = TaskRecord::from_new(self.id_gen.generate_task_id(), task, now);
            state.insert_task(record.clone());
            saved.push(record);
        }
        Ok(saved)
    }

    async fn save_task(&self, task: &TaskRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.tasks.get_mut(&task.task_id) else {
            return Err(StoreError::TaskNotFound(task.task_id));
        };
        if stored.record.is_terminal() {
            return Err(StoreError::TaskTerminal(task.task_id));
        }
        stored.record = task.clone();
        Ok(())
    }

    async fn find_task(&self, task_id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.tasks.get(&task_id).map(|s| s.record.clone()))
    }

    async fn find_tasks(&self, query: TaskQuery) -> Result<Vec<TaskRecord>, StoreError> {
        let state = self.state.lock().await;
        let mut found: Vec<&StoredTask> = state
            .tasks
            .values()
            .filter(|s| query.matches(&s.record))
            .collect();
        found.sort_by_key(|s| (s.record.step_number, s.seq));
        Ok(found.into_iter().map(|s| s.record.clone()).collect())
    }

    async fn claim(&self, task_id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let Some(stored) = state.tasks.get_mut(&task_id) else {
            return Err(StoreError::TaskNotFound(task_id));
        };
        if stored.record.start(now) {
            Ok(Some(stored.record.clone()))
        } else {
            Ok(None)
        }
    }
}

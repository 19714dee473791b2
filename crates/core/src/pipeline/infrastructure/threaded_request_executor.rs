use crate::pipeline::verification_request::{
    RequestHandler, VerificationRequest, VerificationResponse,
};
use crate::shared::error::VerificationError;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Builds one worker's handler, on that worker's thread.
pub type HandlerFactory<'a> =
    dyn Fn(usize) -> Result<Box<dyn RequestHandler>, VerificationError> + Sync + 'a;

/// Runs independent verification requests on a fixed pool of worker
/// threads fed through a bounded channel.
///
/// Each worker builds and owns its own services, so nothing mutable is
/// shared between requests. Responses come back in submission order.
pub struct ThreadedRequestExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedRequestExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn execute(
        &self,
        requests: Vec<VerificationRequest>,
        factory: &HandlerFactory<'_>,
    ) -> Vec<VerificationResponse> {
        let total = requests.len();
        if total == 0 {
            return Vec::new();
        }
        let workers = self.workers.min(total);
        log::info!("Running {total} requests on {workers} workers");

        let (job_tx, job_rx) =
            crossbeam_channel::bounded::<(usize, VerificationRequest)>(self.channel_capacity);
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, VerificationResponse)>();

        // A request held by a worker that panics gets a fallback answer below.
        let submitted = requests.clone();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker_id| {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || run_worker(worker_id, factory, job_rx, result_tx))
                })
                .collect();
            drop(job_rx);
            drop(result_tx);

            for job in requests.into_iter().enumerate() {
                if job_tx.send(job).is_err() {
                    log::error!("All workers exited before every request was submitted");
                    break;
                }
            }
            drop(job_tx);

            // Joined explicitly so a worker panic is not re-raised by the scope.
            for (worker_id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    log::error!("Worker {worker_id} panicked; its in-flight request is unanswered");
                }
            }
        });

        let mut slots: Vec<Option<VerificationResponse>> = (0..total).map(|_| None).collect();
        for (index, response) in result_rx {
            slots[index] = Some(response);
        }

        slots
            .into_iter()
            .zip(&submitted)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    VerificationResponse::failed(request, "worker", "request was not processed")
                })
            })
            .collect()
    }
}

fn run_worker(
    worker_id: usize,
    factory: &HandlerFactory<'_>,
    job_rx: crossbeam_channel::Receiver<(usize, VerificationRequest)>,
    result_tx: crossbeam_channel::Sender<(usize, VerificationResponse)>,
) {
    let mut handler = match factory(worker_id) {
        Ok(handler) => handler,
        Err(e) => {
            log::error!("Worker {worker_id} could not build its services: {e}");
            // Answer this worker's share of requests with the setup error.
            for (index, request) in job_rx {
                let response = VerificationResponse::failed(&request, e.kind(), &e.to_string());
                if result_tx.send((index, response)).is_err() {
                    break;
                }
            }
            return;
        }
    };

    for (index, request) in job_rx {
        log::debug!("Worker {worker_id} handling request {index} for {}", request.user());
        let response = handler.handle(&request);
        if result_tx.send((index, response)).is_err() {
            break;
        }
    }
}

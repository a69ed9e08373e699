use crate::cli::{CountArgs, SampleSpec};
use crate::rmaf::{
    counting::SiteSupport,
    evaluate::{evaluate_mutation, Params},
    mutation::Mutation,
    table::{MutationTable, EXTRA_COLUMNS},
};
use crate::utils::{probe_bam, resolve_sample_name, Result};
use itertools::Itertools;
use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use rust_htslib::bam;
use std::{
    cell::RefCell,
    collections::{hash_map::Entry, HashMap, HashSet},
    path::PathBuf,
};

thread_local! {
    // One reader per alignment file per worker thread; handles are never
    // shared across concurrent queries.
    static READER_CACHE: RefCell<HashMap<PathBuf, bam::IndexedReader>> =
        RefCell::new(HashMap::new());
}

/// One (mutation row x sample) evaluation, with the output fields already
/// carrying the sample name it is evaluated for.
struct Job {
    fields: Vec<String>,
    bam_path: PathBuf,
    mutation: Mutation,
}

pub fn count(args: CountArgs) -> Result<()> {
    if args.samples.is_empty() && args.all_samples.is_empty() {
        return Err("At least one alignment file is required (--sample or --all)".into());
    }

    let sample_map = resolve_sample_map(&args.samples)?;
    let all_samples = resolve_all_samples(&args.all_samples)?;
    log::info!("Input files and samples are:");
    for (name, path) in sample_map.iter().sorted() {
        log::info!("Sample: {} File: {}", name, path.display());
    }
    for (name, path) in &all_samples {
        log::info!("Sample: {} File: {} (all mutations)", name, path.display());
    }
    probe_alignment_files(sample_map.values().chain(all_samples.iter().map(|(_, p)| p)));

    let table = MutationTable::open(&args.mutations_path)?;
    let (jobs, samples_not_found) = build_jobs(&table, &sample_map, &all_samples)?;
    log::info!(
        "Evaluating {} mutation-sample pairs across {} mutations",
        jobs.len(),
        table.rows.len()
    );

    let params = Params {
        exclude_duplicates: args.exclude_duplicates,
    };
    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads)?;
    let supports: Vec<SiteSupport> = pool.install(|| {
        jobs.par_iter()
            .map(|job| evaluate_job(job, &params))
            .collect()
    });

    write_output(&args.output_path, &table, &jobs, &supports)?;

    for sample in &samples_not_found {
        log::warn!("Sample {} not in files", sample);
    }

    Ok(())
}

fn evaluate_job(job: &Job, params: &Params) -> SiteSupport {
    READER_CACHE.with(|cache_cell| {
        let mut cache = cache_cell.borrow_mut();
        let reader = match cache.entry(job.bam_path.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match bam::IndexedReader::from_path(&job.bam_path) {
                Ok(reader) => entry.insert(reader),
                Err(e) => {
                    log::warn!("Failed to open {}: {}", job.bam_path.display(), e);
                    return SiteSupport::Unavailable;
                }
            },
        };
        evaluate_mutation(reader, &job.mutation, params)
    })
}

fn build_jobs(
    table: &MutationTable,
    sample_map: &HashMap<String, PathBuf>,
    all_samples: &[(String, PathBuf)],
) -> Result<(Vec<Job>, Vec<String>)> {
    let mut jobs = Vec::new();
    let mut samples_not_found: Vec<String> = Vec::new();

    for index in 0..table.rows.len() {
        let mutation = table.mutation(index)?;
        let fields = table.rows[index].iter().map(str::to_string).collect_vec();
        let sample = table.sample(index);

        if let Some(path) = sample_map.get(sample) {
            jobs.push(Job {
                fields: fields.clone(),
                bam_path: path.clone(),
                mutation: mutation.clone(),
            });
        } else if !samples_not_found.iter().any(|s| s.as_str() == sample) {
            samples_not_found.push(sample.to_string());
        }

        for (name, path) in all_samples {
            let mut fields = fields.clone();
            fields[table.sample_column()] = name.clone();
            jobs.push(Job {
                fields,
                bam_path: path.clone(),
                mutation: mutation.clone(),
            });
        }
    }

    Ok((jobs, samples_not_found))
}

fn write_output(
    output_path: &str,
    table: &MutationTable,
    jobs: &[Job],
    supports: &[SiteSupport],
) -> Result<()> {
    let io_error = |e: csv::Error| format!("Failed to write {}: {}", output_path, e);
    let mut writer = csv::Writer::from_path(output_path)
        .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;

    let header = table.header.iter().chain(EXTRA_COLUMNS).collect_vec();
    writer.write_record(&header).map_err(io_error)?;

    for (job, support) in jobs.iter().zip(supports) {
        let counts = support.fields();
        let record = job
            .fields
            .iter()
            .map(String::as_str)
            .chain(counts.iter().map(String::as_str));
        writer.write_record(record).map_err(io_error)?;
    }

    writer.flush().map_err(|e| format!("Failed to write {}: {}", output_path, e))
}

fn resolve_sample_map(specs: &[SampleSpec]) -> Result<HashMap<String, PathBuf>> {
    let mut map = HashMap::new();
    for spec in specs {
        let name = resolve_spec_name(spec)?;
        if map.insert(name.clone(), spec.path.clone()).is_some() {
            log::warn!("Multiple files for sample: {}, using the last one", name);
        }
    }
    Ok(map)
}

fn resolve_all_samples(specs: &[SampleSpec]) -> Result<Vec<(String, PathBuf)>> {
    let mut samples: Vec<(String, PathBuf)> = Vec::new();
    for spec in specs {
        let name = resolve_spec_name(spec)?;
        if let Some(entry) = samples.iter_mut().find(|(existing, _)| *existing == name) {
            log::warn!("Multiple files for sample: {}, using the last one", name);
            entry.1 = spec.path.clone();
        } else {
            samples.push((name, spec.path.clone()));
        }
    }
    Ok(samples)
}

fn resolve_spec_name(spec: &SampleSpec) -> Result<String> {
    match &spec.name {
        Some(name) => Ok(name.clone()),
        None => {
            let header = probe_bam(&spec.path)?;
            resolve_sample_name(&spec.path, &header)
        }
    }
}

fn probe_alignment_files<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths.collect::<HashSet<_>>() {
        if let Err(e) = probe_bam(path) {
            log::warn!(
                "{}; its mutations will be reported as unavailable",
                e
            );
        }
    }
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("rmafster-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}

use crate::{
    commands::resolve,
    db::{db::Db, job_items::JobItems, jobs::Jobs},
    libs::{
        job::{Job, JobFilter, JobPatch, JobPriority, JobSite, JobStatus, NewJob},
        messages::Message,
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct JobArgs {
    #[command(subcommand)]
    command: JobCommand,
}

/// Site details shared by `create` and `update`.
#[derive(Debug, Args)]
struct SiteArgs {
    /// Site address
    #[arg(long)]
    address: Option<String>,
    /// On-site contact name
    #[arg(long)]
    contact: Option<String>,
    /// On-site contact phone
    #[arg(long)]
    phone: Option<String>,
    /// Free-form schedule note
    #[arg(long)]
    schedule: Option<String>,
}

impl SiteArgs {
    fn is_empty(&self) -> bool {
        self.address.is_none() && self.contact.is_none() && self.phone.is_none() && self.schedule.is_none()
    }

    /// Overlays the given fields on `base`.
    fn merge_into(self, base: Option<JobSite>) -> JobSite {
        let mut site = base.unwrap_or_default();
        if self.address.is_some() {
            site.address = self.address;
        }
        if self.contact.is_some() {
            site.contact_name = self.contact;
        }
        if self.phone.is_some() {
            site.contact_phone = self.phone;
        }
        if self.schedule.is_some() {
            site.schedule_note = self.schedule;
        }
        site
    }
}

#[derive(Debug, Subcommand)]
enum JobCommand {
    /// Create a new job
    Create {
        /// Job title
        title: String,
        /// External reference (quote or order number)
        #[arg(short, long)]
        reference: Option<String>,
        #[arg(short, long, value_enum)]
        status: Option<JobStatus>,
        #[arg(short, long, value_enum)]
        priority: Option<JobPriority>,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// List jobs
    List {
        #[arg(short, long, value_enum)]
        status: Option<JobStatus>,
        /// Include archived jobs
        #[arg(short, long)]
        all: bool,
        /// Case-insensitive search in title and reference
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// Show a job and its items
    Show {
        /// Job id or id prefix
        id: String,
    },
    /// Update job fields
    Update {
        /// Job id or id prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        reference: Option<String>,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Change the status of a job
    Status {
        /// Job id or id prefix
        id: String,
        #[arg(value_enum)]
        status: JobStatus,
    },
    /// Change the priority of a job
    Priority {
        /// Job id or id prefix
        id: String,
        #[arg(value_enum)]
        priority: JobPriority,
    },
    /// Archive a job
    Archive {
        /// Job id or id prefix
        id: String,
    },
    /// Copy a job under a new title
    Duplicate {
        /// Job id or id prefix
        id: String,
        /// Text appended to the copied title
        #[arg(long)]
        suffix: Option<String>,
    },
}

pub fn cmd(args: JobArgs) -> Result<()> {
    let db = Db::new()?;
    let jobs = Jobs::new(&db);

    match args.command {
        JobCommand::Create {
            title,
            reference,
            status,
            priority,
            site,
        } => {
            let site = if site.is_empty() { None } else { Some(site.merge_into(None)) };
            let job = jobs.create(NewJob {
                title,
                reference,
                status,
                priority,
                site,
            })?;
            msg_success!(Message::JobCreated(job.title.clone()));
            View::job(&job)?;
        }
        JobCommand::List { status, all, search } => {
            let list = jobs.list(&JobFilter {
                status,
                include_archived: all,
                search,
            })?;
            if list.is_empty() {
                msg_info!(Message::NoJobsFound);
                return Ok(());
            }
            msg_print!(Message::JobListHeader, true);
            View::jobs(&list)?;
        }
        JobCommand::Show { id } => {
            let job: Job = resolve(&db, &id)?;
            View::job(&job)?;

            let items = JobItems::new(&db).list_by_job(&job.id, true)?;
            if items.is_empty() {
                msg_info!(Message::NoItemsForJob(job.title));
            } else {
                msg_print!(Message::JobItemsHeader(job.title), true);
                View::job_items(&items)?;
            }
        }
        JobCommand::Update { id, title, reference, site } => {
            let job: Job = resolve(&db, &id)?;
            let site = if site.is_empty() { None } else { Some(Some(site.merge_into(job.site.clone()))) };
            let patch = JobPatch {
                title,
                reference: reference.map(Some),
                site,
                ..Default::default()
            };
            let job = jobs.update(&job.id, patch)?;
            msg_success!(Message::JobUpdated(job.title.clone()));
        }
        JobCommand::Status { id, status } => {
            let job: Job = resolve(&db, &id)?;
            let job = jobs.set_status(&job.id, status)?;
            msg_success!(Message::JobStatusChanged(job.title, status.to_string()));
        }
        JobCommand::Priority { id, priority } => {
            let job: Job = resolve(&db, &id)?;
            let job = jobs.set_priority(&job.id, priority)?;
            msg_success!(Message::JobPriorityChanged(job.title, priority.to_string()));
        }
        JobCommand::Archive { id } => {
            let job: Job = resolve(&db, &id)?;
            let job = jobs.archive(&job.id)?;
            msg_success!(Message::JobArchived(job.title));
        }
        JobCommand::Duplicate { id, suffix } => {
            let job: Job = resolve(&db, &id)?;
            let copy = jobs.duplicate(&job.id, suffix.as_deref())?;
            msg_success!(Message::JobDuplicated(job.title, copy.title));
        }
    }

    Ok(())
}

use clap::Args;
use prestige::invoices::InvoiceStatus;
use prestige_app::domain::invoices::{InvoicesService, InvoicesServiceError, KvInvoicesService};

#[derive(Debug, Args)]
pub(crate) struct MarkOverdueArgs {
    /// List the invoices that would change without saving
    #[arg(long)]
    dry_run: bool,
}

pub(crate) async fn run(service: &KvInvoicesService, args: MarkOverdueArgs) -> Result<(), String> {
    let invoices = service
        .list_invoices(Some(InvoiceStatus::Overdue))
        .await
        .map_err(|error| format!("failed to list invoices: {error}"))?;

    let mut marked = 0_usize;

    for invoice in invoices {
        if args.dry_run {
            println!("{}\t{}\tdue {}", invoice.uuid, invoice.number, invoice.due_date);
            marked += 1;
            continue;
        }

        match service.mark_invoice_overdue(invoice.uuid).await {
            Ok(updated) => {
                println!("{}\t{}\tdue {}", updated.uuid, updated.number, updated.due_date);
                marked += 1;
            }
            // Already stored as overdue.
            Err(InvoicesServiceError::PreconditionFailed(_)) => {}
            Err(error) => return Err(format!("failed to mark {}: {error}", invoice.number)),
        }
    }

    if args.dry_run {
        println!("{marked} invoice(s) past due");
    } else {
        println!("marked {marked} invoice(s) overdue");
    }

    Ok(())
}

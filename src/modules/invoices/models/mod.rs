mod draft;
mod invoice;
mod line_item;

pub use draft::{recompute_totals, InvoiceDraft, LineDraft, PreviewProduct, PreviewRequest, Totals};
pub use invoice::{
    next_invoice_number, CreateInvoiceRequest, CreatedInvoice, DiscountedTotals, Invoice,
    InvoiceChanges, InvoiceFilter, InvoiceView, NewInvoice, DEFAULT_FIRST_INVOICE_NUMBER,
};
pub use line_item::{
    line_subtotal, lines_subtotal, CreateDetailRequest, InvoiceDetail, NewInvoiceDetail,
};

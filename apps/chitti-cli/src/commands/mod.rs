pub mod group;
pub mod lottery;
pub mod payment;
pub mod report;

pub use group::{
    cmd_group_add_member, cmd_group_close, cmd_group_create, cmd_group_delete, cmd_group_edit,
    cmd_group_list, cmd_group_participants, cmd_group_reconcile, cmd_group_remove_member,
    cmd_group_show,
};
pub use lottery::{cmd_lottery_delete, cmd_lottery_draw, cmd_lottery_list};
pub use payment::{cmd_payment_batch, cmd_payment_delete, cmd_payment_list, cmd_payment_record};
pub use report::{cmd_report_dashboard, cmd_report_export, cmd_report_show};

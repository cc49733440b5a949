/// Out-of-band notice for the administrator after a report is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAlert {
    Cleaning {
        staff: String,
        room: String,
        status: String,
    },
    Maintenance {
        staff: String,
        issue: String,
    },
    TaskCompleted {
        staff: String,
        task: String,
    },
}

impl AdminAlert {
    pub fn message(&self) -> String {
        match self {
            AdminAlert::Cleaning {
                staff,
                room,
                status,
            } => format!(
                "🔔 **Cleaning Alert**\nStaff: {}\nRoom: {}\nStatus: {}",
                staff, room, status
            ),
            AdminAlert::Maintenance { staff, issue } => {
                format!("⚠️ **Maintenance Issue**\nStaff: {}\nIssue: {}", staff, issue)
            }
            AdminAlert::TaskCompleted { staff, task } => {
                format!("📋 **Task Completed**\nStaff: {}\nTask: {}", staff, task)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_messages() {
        let alert = AdminAlert::Cleaning {
            staff: "Ana".to_string(),
            room: "101".to_string(),
            status: "Clean".to_string(),
        };
        assert_eq!(
            alert.message(),
            "🔔 **Cleaning Alert**\nStaff: Ana\nRoom: 101\nStatus: Clean"
        );

        let alert = AdminAlert::Maintenance {
            staff: "Ben".to_string(),
            issue: "No hot water".to_string(),
        };
        assert!(alert.message().ends_with("Issue: No hot water"));
    }
}

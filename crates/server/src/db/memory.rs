//! In-memory implementation of [`Store`].
//!
//! Everything lives in `BTreeMap`s behind a single `tokio::sync::RwLock`, so
//! listings come out ordered by id and every mutation is atomic within the
//! process. State is lost on restart. Used by tests and local experiments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use helpdesk_core::{AdminLoad, Email, Role, TicketId, TicketStatus, UserId};

use super::{RepositoryError, Store};
use crate::models::{
    NewTicket, NewUser, PartySummary, Ticket, TicketChanges, TicketDetails, TicketFilter, User,
};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, (User, String)>,
    tickets: BTreeMap<TicketId, Ticket>,
    next_user_id: i32,
    next_ticket_id: i32,
}

impl Inner {
    fn party(&self, id: UserId) -> Result<PartySummary, RepositoryError> {
        self.users
            .get(&id)
            .map(|(user, _)| PartySummary {
                name: user.name.clone(),
                email: user.email.clone(),
            })
            .ok_or_else(|| RepositoryError::DataCorruption(format!("ticket party {id} missing")))
    }

    fn details(&self, ticket: &Ticket) -> Result<TicketDetails, RepositoryError> {
        Ok(TicketDetails {
            ticket: ticket.clone(),
            customer: self.party(ticket.customer_id)?,
            admin: self.party(ticket.admin_id)?,
        })
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with the given role.
    pub async fn count_users(&self, role: Role) -> usize {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .filter(|(user, _)| user.role == role)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|(user, _)| user.email == new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.next_user_id),
            name: new.name,
            email: new.email,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        inner
            .users
            .insert(user.id, (user.clone(), new.password_hash));
        Ok(user)
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|(user, _)| user.is_admin()))
    }

    async fn list_admin_loads(&self) -> Result<Vec<AdminLoad>, RepositoryError> {
        let inner = self.inner.read().await;
        let loads = inner
            .users
            .values()
            .filter(|(user, _)| user.is_admin())
            .map(|(admin, _)| {
                let open = inner
                    .tickets
                    .values()
                    .filter(|t| t.admin_id == admin.id && t.status.is_open())
                    .count();
                AdminLoad::new(admin.id, u64::try_from(open).unwrap_or(u64::MAX))
            })
            .collect();
        Ok(loads)
    }

    async fn create_ticket(&self, new: NewTicket) -> Result<TicketDetails, RepositoryError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&new.customer_id) || !inner.users.contains_key(&new.admin_id)
        {
            return Err(RepositoryError::Conflict(
                "ticket party does not exist".to_owned(),
            ));
        }

        inner.next_ticket_id += 1;
        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId::new(inner.next_ticket_id),
            subject: new.subject,
            description: new.description,
            status: TicketStatus::Open,
            customer_id: new.customer_id,
            admin_id: new.admin_id,
            created_at: now,
            updated_at: now,
        };
        inner.tickets.insert(ticket.id, ticket.clone());
        inner.details(&ticket)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.tickets.get(&id).cloned())
    }

    async fn list_tickets(
        &self,
        filter: TicketFilter,
    ) -> Result<Vec<TicketDetails>, RepositoryError> {
        let inner = self.inner.read().await;
        inner
            .tickets
            .values()
            .filter(|ticket| filter.matches(ticket))
            .map(|ticket| inner.details(ticket))
            .collect()
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        changes: TicketChanges,
        reassign_to: Option<UserId>,
    ) -> Result<TicketDetails, RepositoryError> {
        let mut inner = self.inner.write().await;
        if let Some(admin_id) = reassign_to
            && !inner.users.contains_key(&admin_id)
        {
            return Err(RepositoryError::Conflict(
                "assigned admin does not exist".to_owned(),
            ));
        }

        let ticket = inner.tickets.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(subject) = changes.subject {
            ticket.subject = subject;
        }
        if let Some(description) = changes.description {
            ticket.description = description;
        }
        if let Some(status) = changes.status {
            ticket.status = status;
        }
        if let Some(admin_id) = reassign_to {
            ticket.admin_id = admin_id;
        }
        ticket.updated_at = Utc::now();

        let ticket = ticket.clone();
        inner.details(&ticket)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tickets.remove(&id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, role: Role) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            role,
        }
    }

    fn new_ticket(customer: UserId, admin: UserId) -> NewTicket {
        NewTicket {
            subject: "Printer on fire".to_owned(),
            description: "Smoke everywhere".to_owned(),
            customer_id: customer,
            admin_id: admin,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("Ann", "ann@example.com", Role::Customer))
            .await
            .unwrap();

        let err = store
            .create_user(new_user("Ann Again", "ann@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.count_users(Role::Admin).await, 0);
    }

    #[tokio::test]
    async fn test_admin_loads_count_only_open_tickets() {
        let store = MemoryStore::new();
        let customer = store
            .create_user(new_user("Cat", "cat@example.com", Role::Customer))
            .await
            .unwrap();
        let busy = store
            .create_user(new_user("Busy", "busy@example.com", Role::Admin))
            .await
            .unwrap();
        let idle = store
            .create_user(new_user("Idle", "idle@example.com", Role::Admin))
            .await
            .unwrap();

        let closed = store
            .create_ticket(new_ticket(customer.id, busy.id))
            .await
            .unwrap();
        let resolved = store
            .create_ticket(new_ticket(customer.id, busy.id))
            .await
            .unwrap();
        store
            .create_ticket(new_ticket(customer.id, busy.id))
            .await
            .unwrap();

        for (id, status) in [
            (closed.ticket.id, TicketStatus::Closed),
            (resolved.ticket.id, TicketStatus::Resolved),
        ] {
            store
                .update_ticket(
                    id,
                    TicketChanges {
                        status: Some(status),
                        ..TicketChanges::default()
                    },
                    None,
                )
                .await
                .unwrap();
        }

        let loads = store.list_admin_loads().await.unwrap();
        assert_eq!(
            loads,
            vec![AdminLoad::new(busy.id, 1), AdminLoad::new(idle.id, 0)]
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_customer() {
        let store = MemoryStore::new();
        let admin = store
            .create_user(new_user("Root", "root@example.com", Role::Admin))
            .await
            .unwrap();
        let alice = store
            .create_user(new_user("Alice", "alice@example.com", Role::Customer))
            .await
            .unwrap();
        let bob = store
            .create_user(new_user("Bob", "bob@example.com", Role::Customer))
            .await
            .unwrap();

        store.create_ticket(new_ticket(alice.id, admin.id)).await.unwrap();
        store.create_ticket(new_ticket(bob.id, admin.id)).await.unwrap();

        let all = store.list_tickets(TicketFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].ticket.id < all[1].ticket.id);

        let mine = store
            .list_tickets(TicketFilter::Customer(bob.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer.name, "Bob");
        assert_eq!(mine[0].admin.email.as_str(), "root@example.com");
    }

    #[tokio::test]
    async fn test_update_missing_ticket_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_ticket(TicketId::new(99), TicketChanges::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = MemoryStore::new();
        let admin = store
            .create_user(new_user("Root", "root@example.com", Role::Admin))
            .await
            .unwrap();
        let customer = store
            .create_user(new_user("Cat", "cat@example.com", Role::Customer))
            .await
            .unwrap();
        let created = store
            .create_ticket(new_ticket(customer.id, admin.id))
            .await
            .unwrap();

        assert!(store.delete_ticket(created.ticket.id).await.unwrap());
        assert!(!store.delete_ticket(created.ticket.id).await.unwrap());
        assert!(store.get_ticket(created.ticket.id).await.unwrap().is_none());
    }
}

//! [`ContentApi`] implementation backed by the REST client.

use mdconf_sync::{Author, ContentApi, NewPage, PageUpdate, RemoteError, RemotePage};
use tracing::info;

use crate::client::{ConfluenceClient, PageContent};
use crate::types::{Page, User};

impl ContentApi for ConfluenceClient {
    fn exists(
        &self,
        label: &str,
        space: &str,
        ancestor_id: &str,
    ) -> Result<Option<RemotePage>, RemoteError> {
        let page = self.find_by_label(label, space, ancestor_id)?;
        Ok(page.map(|page| self.remote_page(&page)))
    }

    fn create(&self, new: &NewPage<'_>) -> Result<RemotePage, RemoteError> {
        let content = PageContent {
            title: new.title,
            space: new.space,
            ancestor_id: new.ancestor_id,
            body: new.body,
        };
        let page = self.create_page(new.label, &content)?;
        self.add_labels(&page.id, new.label, new.tags)?;
        Ok(self.remote_page(&page))
    }

    fn update(&self, update: &PageUpdate<'_>) -> Result<RemotePage, RemoteError> {
        // Content references attachments by filename, so upload them first.
        for path in update.attachments {
            self.upload_file(update.page_id, path)?;
        }

        let content = PageContent {
            title: update.title,
            space: update.space,
            ancestor_id: update.ancestor_id,
            body: update.content,
        };
        let page = self.update_page(update.page_id, &content, update.page_version)?;
        self.add_labels(update.page_id, update.label, update.tags)?;
        Ok(self.remote_page(&page))
    }

    fn get_author(&self, identifier: &str) -> Result<Option<Author>, RemoteError> {
        let user = self.get_user(identifier)?;
        Ok(user.map(|user| author(identifier, user)))
    }
}

impl ConfluenceClient {
    fn remote_page(&self, page: &Page) -> RemotePage {
        RemotePage {
            id: page.id.clone(),
            version: page.version_number(),
            url: (!self.is_dry_run()).then(|| self.page_url(page)),
        }
    }
}

fn author(identifier: &str, user: User) -> Author {
    info!(
        "Resolved author {} to {}",
        identifier,
        user.display_name.as_deref().unwrap_or(identifier)
    );
    Author {
        identifier: identifier.to_owned(),
        account_id: user.account_id,
        user_key: user.user_key,
        display_name: user.display_name,
    }
}

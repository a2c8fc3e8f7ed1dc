use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use tracing::{debug, instrument};

use crate::{
    AppState,
    api::{
        handlers::render_page,
        models::lists::{DUPLICATE_ITEM_ERROR, ItemForm},
    },
    auth::current_user::MaybeUser,
    db::{
        handlers::{Items, Lists, Repository},
        models::{
            items::{ItemCreateDBRequest, ItemDBResponse, ItemFilter},
            lists::ListCreateDBRequest,
        },
    },
    errors::Error,
    messages::IncomingMessages,
    types::ListId,
};

fn list_url(list_id: ListId) -> String {
    format!("/lists/{list_id}/")
}

/// Parse the `{id}` path segment. Anything that isn't a list id is simply not found.
fn parse_list_id(raw: &str) -> Result<ListId, Error> {
    raw.parse::<ListId>().map_err(|_| Error::NotFound {
        resource: "List".to_string(),
        id: raw.to_string(),
    })
}

#[instrument(skip_all)]
pub async fn home_page(State(state): State<AppState>, user: MaybeUser, incoming: IncomingMessages) -> Result<Response, Error> {
    render_page(&state, "home.html", &user, &incoming, context! {})
}

/// Start a new list with its first item, or show the home page again with an inline error.
#[instrument(skip_all)]
pub async fn new_list(
    State(state): State<AppState>,
    user: MaybeUser,
    incoming: IncomingMessages,
    Form(form): Form<ItemForm>,
) -> Result<Response, Error> {
    let text = match form.validated_text() {
        Ok(text) => text,
        Err(error) => {
            debug!("Rejected new list: {error}");
            return render_page(&state, "home.html", &user, &incoming, context! { error, text => form.text });
        }
    };

    let mut tx = state.db.begin().await.map_err(crate::db::errors::DbError::from)?;
    let list = Lists::new(&mut tx).create(&ListCreateDBRequest).await?;
    Items::new(&mut tx)
        .create(&ItemCreateDBRequest {
            list_id: list.id,
            text: text.to_string(),
        })
        .await?;
    tx.commit().await.map_err(crate::db::errors::DbError::from)?;

    debug!(list_id = list.id, "Created list");
    Ok(Redirect::to(&list_url(list.id)).into_response())
}

async fn list_items(state: &AppState, raw_id: &str) -> Result<(ListId, Vec<ItemDBResponse>), Error> {
    let list_id = parse_list_id(raw_id)?;
    let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;

    Lists::new(&mut conn).get_by_id(list_id).await?.ok_or_else(|| Error::NotFound {
        resource: "List".to_string(),
        id: list_id.to_string(),
    })?;
    let items = Items::new(&mut conn).list(&ItemFilter::for_list(list_id)).await?;

    Ok((list_id, items))
}

#[instrument(skip(state, user, incoming))]
pub async fn view_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: MaybeUser,
    incoming: IncomingMessages,
) -> Result<Response, Error> {
    let (list_id, items) = list_items(&state, &id).await?;
    render_page(&state, "list.html", &user, &incoming, context! { list_id, items })
}

/// Append an item to an existing list. Empty and duplicate items re-render the list with an error.
#[instrument(skip(state, user, incoming, form))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: MaybeUser,
    incoming: IncomingMessages,
    Form(form): Form<ItemForm>,
) -> Result<Response, Error> {
    let (list_id, items) = list_items(&state, &id).await?;

    let rejected = |error: &str| {
        debug!(list_id, "Rejected item: {error}");
        render_page(
            &state,
            "list.html",
            &user,
            &incoming,
            context! { list_id, items, error, text => form.text },
        )
    };

    let text = match form.validated_text() {
        Ok(text) => text,
        Err(error) => return rejected(error),
    };

    let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;
    let mut repo = Items::new(&mut conn);
    if repo.exists_in_list(list_id, text).await? {
        return rejected(DUPLICATE_ITEM_ERROR);
    }

    match repo
        .create(&ItemCreateDBRequest {
            list_id,
            text: text.to_string(),
        })
        .await
    {
        Ok(_) => Ok(Redirect::to(&list_url(list_id)).into_response()),
        // Lost a race with an identical submission
        Err(e) if e.is_unique_violation_on("items") => rejected(DUPLICATE_ITEM_ERROR),
        Err(e) => Err(e.into()),
    }
}

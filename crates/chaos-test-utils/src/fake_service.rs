//! In-memory stand-in for the book library API
//!
//! Routes:
//! - `GET /books`, `POST /books`
//! - `GET|PUT|DELETE /books/{id}`, anything else on an item is `405`
//! - every other path is `404`

use chaos_core::{Method, Request, RequestBody, Response, Transport, TransportError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBook {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub published_year: Option<u16>,
    pub genre: Option<String>,
    pub isbn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateBook {
    title: String,
    author: String,
    published_year: Option<u16>,
    genre: Option<String>,
    isbn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateBook {
    title: Option<String>,
    author: Option<String>,
    published_year: Option<u16>,
    genre: Option<String>,
    isbn: Option<String>,
}

#[derive(Debug)]
struct State {
    books: BTreeMap<u64, StoredBook>,
    next_id: u64,
    offline: bool,
}

/// Fake book service implementing [`Transport`]
#[derive(Debug)]
pub struct FakeBookService {
    state: Mutex<State>,
    requests: Mutex<Vec<Request>>,
}

impl Default for FakeBookService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBookService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                books: BTreeMap::new(),
                next_id: 1,
                offline: false,
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Insert a book directly, bypassing the API
    pub fn seed_book(&self, title: &str, author: &str) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.books.insert(
            id,
            StoredBook {
                id,
                title: title.to_string(),
                author: author.to_string(),
                published_year: None,
                genre: None,
                isbn: None,
            },
        );
        id
    }

    /// While offline every request fails with a connect error
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Remove a book behind the client's back
    pub fn remove_book(&self, id: u64) -> bool {
        self.state.lock().books.remove(&id).is_some()
    }

    pub fn book(&self, id: u64) -> Option<StoredBook> {
        self.state.lock().books.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.state.lock().books.keys().copied().collect()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    fn handle(&self, request: &Request) -> Response {
        let segments: Vec<&str> = request
            .path
            .trim_start_matches('/')
            .split('/')
            .collect();
        match segments.as_slice() {
            ["books"] => match request.method {
                Method::Get => self.list(),
                Method::Post => self.create(&request.body),
                _ => Response::new(405, "Method Not Allowed"),
            },
            ["books", raw_id] => {
                let Ok(id) = raw_id.parse::<u64>() else {
                    return Response::new(404, "Not Found");
                };
                match request.method {
                    Method::Get => self.get(id),
                    Method::Put => self.update(id, &request.body),
                    Method::Delete => self.delete(id),
                    Method::Post | Method::Patch => Response::new(405, "Method Not Allowed"),
                }
            }
            _ => Response::new(404, "Not Found"),
        }
    }

    fn list(&self) -> Response {
        let state = self.state.lock();
        let books: Vec<&StoredBook> = state.books.values().collect();
        json_response(200, &books)
    }

    fn get(&self, id: u64) -> Response {
        match self.state.lock().books.get(&id) {
            Some(book) => json_response(200, book),
            None => not_found(id),
        }
    }

    fn create(&self, body: &RequestBody) -> Response {
        let dto: CreateBook = match parse_body(body) {
            Ok(dto) => dto,
            Err(resp) => return resp,
        };
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let book = StoredBook {
            id,
            title: dto.title,
            author: dto.author,
            published_year: dto.published_year,
            genre: dto.genre,
            isbn: dto.isbn,
        };
        state.books.insert(id, book.clone());
        json_response(201, &book)
    }

    fn update(&self, id: u64, body: &RequestBody) -> Response {
        let dto: UpdateBook = match parse_body(body) {
            Ok(dto) => dto,
            Err(resp) => return resp,
        };
        let mut state = self.state.lock();
        let Some(book) = state.books.get_mut(&id) else {
            return not_found(id);
        };
        if let Some(title) = dto.title {
            book.title = title;
        }
        if let Some(author) = dto.author {
            book.author = author;
        }
        book.published_year = dto.published_year;
        book.genre = dto.genre;
        book.isbn = dto.isbn;
        json_response(200, &*book)
    }

    fn delete(&self, id: u64) -> Response {
        if self.state.lock().books.remove(&id).is_some() {
            Response::new(204, "")
        } else {
            not_found(id)
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakeBookService {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.requests.lock().push(request.clone());
        if self.state.lock().offline {
            return Err(TransportError::Connect("connection refused".to_string()));
        }
        Ok(self.handle(&request))
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &RequestBody) -> Result<T, Response> {
    let raw = match body {
        RequestBody::Json(value) => value.to_string(),
        RequestBody::Raw { data, .. } => data.clone(),
        RequestBody::Empty => String::new(),
    };
    serde_json::from_str(&raw).map_err(|e| Response::new(400, format!("Json deserialize error: {e}")))
}

fn json_response<T: Serialize + ?Sized>(status: u16, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => Response::new(status, body),
        Err(e) => Response::new(500, e.to_string()),
    }
}

fn not_found(id: u64) -> Response {
    Response::new(404, format!("Book with ID {id} not found"))
}
